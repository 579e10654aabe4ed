//! The protocol's typed error hierarchy.
//!
//! Every framing failure falls into exactly one of these three buckets. None of
//! them are recoverable at the point they're raised — callers always respond by
//! tearing down the connection they came from.

use std::io;

/// Something went wrong reading or writing a length-prefixed frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The peer closed the connection (EOF) before a full frame could be moved.
    #[error("transport closed mid-frame")]
    TransportClosed,

    /// An I/O error occurred that wasn't a clean close.
    #[error("transport error: {0}")]
    TransportError(#[source] io::Error),

    /// The peer sent a length prefix outside the accepted range.
    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),
}

impl From<FrameError> for io::Error {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::TransportClosed => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            FrameError::TransportError(inner) => inner,
            FrameError::ProtocolViolation(_) => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}
