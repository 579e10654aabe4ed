//! The wire protocol spoken between `confab` clients and the relay server.
//!
//! This crate defines the length-prefixed framing contract, the canonical audio
//! format it carries, and the error types raised when a peer misbehaves or goes
//! away. It is intentionally small: everything here is synchronous and
//! transport-agnostic (it works over any [`std::io::Read`] + [`std::io::Write`]
//! pair), so the relay's blocking thread-per-connection model and the client's
//! capture/playback threads can share the same codec without pulling in an async
//! runtime.

pub mod codec;
pub mod error;
pub mod format;

pub use codec::{read_frame, write_frame, MAX_FRAME_BYTES};
pub use error::FrameError;
