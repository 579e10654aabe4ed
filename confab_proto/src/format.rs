//! The canonical audio format carried over the wire.
//!
//! Every constant here describes the *one* format the relay understands natively:
//! 16-bit signed PCM, stereo, 48 kHz, in 20 ms frames. Frames of other sizes are
//! accepted on the wire (the codec doesn't enforce this shape), but only the mixer
//! cares about it, and it treats anything else as implicitly zero-padded or
//! truncated. See `confab_core::frame::mix_frames` for that behavior.

use core::num;

/// Number of interleaved channels (left, right).
pub const CHANNELS: num::NonZeroU32 = num::NonZeroU32::new(2).unwrap();

/// Sample rate, in Hz.
pub const SAMPLE_RATE_HZ: num::NonZeroU32 = num::NonZeroU32::new(48_000).unwrap();

/// Nominal frame duration, in milliseconds.
pub const FRAME_DURATION_MS: num::NonZeroU32 = num::NonZeroU32::new(20).unwrap();

/// Size in bytes of one sample (16-bit signed PCM).
pub const SAMPLE_SIZE_BYTES: num::NonZeroUsize = num::NonZeroUsize::new(2).unwrap();

/// Total interleaved samples per canonical frame (1920 = 960 frames/channel * 2 channels).
pub const CANONICAL_SAMPLE_COUNT: num::NonZeroUsize = num::NonZeroUsize::new(1920).unwrap();

/// Canonical frame size in bytes: 1920 samples * 2 bytes/sample = 3840.
pub const CANONICAL_FRAME_BYTES: num::NonZeroUsize = num::NonZeroUsize::new(3840).unwrap();

const _: () = assert!(
    CANONICAL_FRAME_BYTES.get() == CANONICAL_SAMPLE_COUNT.get() * SAMPLE_SIZE_BYTES.get()
);
