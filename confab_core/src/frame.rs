//! The shared, immutable frame buffer and the mixing algorithm.

use std::sync::Arc;

use confab_proto::format;

/// A frame buffer, shared by reference among every client queue it's enqueued
/// onto. Never mutated after the mixer hands out the first clone.
pub type SharedFrame = Arc<[u8]>;

/// Mixes `frames` down to one canonical-size output frame.
///
/// Each input contributes its available samples; a frame shorter than the
/// canonical size is implicitly zero-padded for the rest, and a longer one is
/// truncated. Summation uses `i16::saturating_add`, so the result is always a
/// valid 16-bit PCM frame regardless of how many voices are talking at once.
///
/// With zero or one input frame, this is the identity: the output equals the
/// (possibly zero-padded/truncated) input, since summing with an all-zero buffer
/// doesn't change anything.
pub fn mix_frames(frames: &[SharedFrame]) -> Vec<u8> {
    let mut out = [0i16; format::CANONICAL_SAMPLE_COUNT.get()];

    for frame in frames {
        let usable_bytes = frame.len().min(format::CANONICAL_FRAME_BYTES.get());
        let usable_samples = usable_bytes / format::SAMPLE_SIZE_BYTES.get();

        for i in 0..usable_samples {
            let lo = frame[2 * i];
            let hi = frame[2 * i + 1];
            let sample = i16::from_le_bytes([lo, hi]);
            out[i] = out[i].saturating_add(sample);
        }
    }

    let mut bytes = Vec::with_capacity(format::CANONICAL_FRAME_BYTES.get());
    for sample in out {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}
