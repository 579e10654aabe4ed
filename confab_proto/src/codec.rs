//! Length-prefixed framing over any reliable, ordered byte stream.
//!
//! Wire shape: a 4-byte big-endian unsigned length `L`, followed by exactly `L`
//! payload bytes. `1 <= L <= MAX_FRAME_BYTES`. No handshake, no heartbeat.

use std::io::{self, Read, Write};

use crate::error::FrameError;

/// Upper bound on an accepted frame's payload length (16 MiB).
pub const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

const LEN_PREFIX_BYTES: usize = 4;

/// Reads bytes into `buf` until it is completely filled, retrying on
/// `Interrupted` and short reads. A read that returns `Ok(0)` before `buf` is
/// full is reported as [`FrameError::TransportClosed`] — this is how EOF manifests
/// on a stream that still has bytes outstanding.
fn read_full(stream: &mut impl Read, buf: &mut [u8]) -> Result<(), FrameError> {
    let mut filled = 0;

    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => return Err(FrameError::TransportClosed),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FrameError::TransportError(e)),
        }
    }

    Ok(())
}

/// Writes all of `buf`, retrying on `Interrupted` and short writes. A write that
/// accepts zero bytes without erroring is reported as
/// [`FrameError::TransportClosed`] — on a stream socket this only happens when the
/// peer has gone away.
fn write_full(stream: &mut impl Write, buf: &[u8]) -> Result<(), FrameError> {
    let mut sent = 0;

    while sent < buf.len() {
        match stream.write(&buf[sent..]) {
            Ok(0) => return Err(FrameError::TransportClosed),
            Ok(n) => sent += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FrameError::TransportError(e)),
        }
    }

    Ok(())
}

/// Reads one length-prefixed frame from `stream`.
///
/// Rejects a zero length prefix or one exceeding [`MAX_FRAME_BYTES`] with
/// [`FrameError::ProtocolViolation`] before attempting to read the payload, so a
/// hostile or confused peer can't make the relay allocate an unbounded buffer.
pub fn read_frame(stream: &mut impl Read) -> Result<Vec<u8>, FrameError> {
    let mut len_buf = [0u8; LEN_PREFIX_BYTES];
    read_full(stream, &mut len_buf)?;

    let len = u32::from_be_bytes(len_buf);

    if len == 0 {
        return Err(FrameError::ProtocolViolation("zero-length frame"));
    }
    if len > MAX_FRAME_BYTES {
        return Err(FrameError::ProtocolViolation("frame exceeds 16 MiB"));
    }

    let mut payload = vec![0u8; len as usize];
    read_full(stream, &mut payload)?;

    Ok(payload)
}

/// Writes one length-prefixed frame to `stream`.
///
/// `payload.len()` must fit in a `u32` and should respect [`MAX_FRAME_BYTES`] for
/// the receiving end to accept it, but this function itself does not reject an
/// oversized payload beyond what `u32` can represent.
pub fn write_frame(stream: &mut impl Write, payload: &[u8]) -> Result<(), FrameError> {
    let len = u32::try_from(payload.len())
        .map_err(|_| FrameError::ProtocolViolation("payload too large to frame"))?;

    write_full(stream, &len.to_be_bytes())?;
    write_full(stream, payload)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_identity() {
        for len in [1usize, 2, 3840, 65536] {
            let payload: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
            let mut buf = Vec::new();
            write_frame(&mut buf, &payload).unwrap();

            let mut cursor = Cursor::new(buf);
            let decoded = read_frame(&mut cursor).unwrap();
            assert_eq!(decoded, payload);
        }
    }

    #[test]
    fn rejects_zero_length() {
        let mut cursor = Cursor::new(0u32.to_be_bytes().to_vec());
        let err = read_frame(&mut cursor).unwrap_err();
        assert!(matches!(err, FrameError::ProtocolViolation(_)));
    }

    #[test]
    fn rejects_oversized_length() {
        let mut cursor = Cursor::new((MAX_FRAME_BYTES + 1).to_be_bytes().to_vec());
        let err = read_frame(&mut cursor).unwrap_err();
        assert!(matches!(err, FrameError::ProtocolViolation(_)));
    }

    #[test]
    fn partial_length_prefix_is_transport_closed() {
        let mut cursor = Cursor::new(vec![0u8, 1u8]);
        let err = read_frame(&mut cursor).unwrap_err();
        assert!(matches!(err, FrameError::TransportClosed));
    }

    #[test]
    fn short_reads_are_reassembled() {
        struct Trickle<'a> {
            data: &'a [u8],
            pos: usize,
        }

        impl<'a> Read for Trickle<'a> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.pos >= self.data.len() {
                    return Ok(0);
                }
                let n = 1.min(buf.len());
                buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
                self.pos += n;
                Ok(n)
            }
        }

        let payload = vec![7u8; 10];
        let mut wire = Vec::new();
        write_frame(&mut wire, &payload).unwrap();

        let mut trickle = Trickle { data: &wire, pos: 0 };
        let decoded = read_frame(&mut trickle).unwrap();
        assert_eq!(decoded, payload);
    }
}
