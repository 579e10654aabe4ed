//! Capture and playback backends.
//!
//! The relay only ever sees bytes; turning those bytes into sound (and sound
//! back into bytes) is entirely the client's concern, abstracted behind two
//! small traits so the binary can swap a real microphone/speaker pair for a
//! silent, deterministic stand-in without touching anything else.

use std::sync::mpsc::{Receiver, Sender};

use confab_proto::format;

/// Produces one canonical-size outgoing frame per call, blocking until it's
/// ready. Implementations are free to pad/resample/whatever internally — the
/// relay itself tolerates undersized or oversized frames, but a well-behaved
/// capture source should hand over exactly [`format::CANONICAL_FRAME_BYTES`].
pub trait CaptureSource: Send {
    fn next_frame(&mut self) -> anyhow::Result<Vec<u8>>;
}

/// Consumes one incoming (already-mixed) frame per call.
pub trait PlaybackSink: Send {
    fn play_frame(&mut self, frame: &[u8]) -> anyhow::Result<()>;
}

/// A microphone-backed [`CaptureSource`] using the host's default input
/// device at the canonical format. The cpal callback runs on its own thread
/// and hands completed frames across a channel so `next_frame` can stay a
/// plain blocking call.
pub struct CpalCapture {
    _stream: cpal::Stream,
    rx: Receiver<Vec<u8>>,
}

impl CpalCapture {
    pub fn default_device() -> anyhow::Result<Self> {
        use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow::anyhow!("no default input device"))?;

        let config = cpal::StreamConfig {
            channels: format::CHANNELS.get() as u16,
            sample_rate: cpal::SampleRate(format::SAMPLE_RATE_HZ.get()),
            buffer_size: cpal::BufferSize::Default,
        };

        let (tx, rx) = std::sync::mpsc::channel::<Vec<u8>>();
        let mut pending: Vec<i16> = Vec::with_capacity(format::CANONICAL_SAMPLE_COUNT.get());

        let stream = device.build_input_stream(
            &config,
            move |data: &[i16], _| forward_samples(data, &mut pending, &tx),
            |err| log::warn!("input stream error: {err}"),
            None,
        )?;

        stream.play()?;

        Ok(Self { _stream: stream, rx })
    }
}

fn forward_samples(data: &[i16], pending: &mut Vec<i16>, tx: &Sender<Vec<u8>>) {
    pending.extend_from_slice(data);
    while pending.len() >= format::CANONICAL_SAMPLE_COUNT.get() {
        let chunk: Vec<i16> = pending.drain(..format::CANONICAL_SAMPLE_COUNT.get()).collect();
        let mut bytes = Vec::with_capacity(format::CANONICAL_FRAME_BYTES.get());
        for sample in chunk {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }
        if tx.send(bytes).is_err() {
            return;
        }
    }
}

impl CaptureSource for CpalCapture {
    fn next_frame(&mut self) -> anyhow::Result<Vec<u8>> {
        self.rx
            .recv()
            .map_err(|_| anyhow::anyhow!("capture stream disconnected"))
    }
}

/// A speaker-backed [`PlaybackSink`] using the host's default output device.
/// Frames handed to `play_frame` are pushed into a small ring that the output
/// callback drains; if the callback runs dry it plays silence rather than
/// blocking.
pub struct CpalPlayback {
    _stream: cpal::Stream,
    tx: Sender<Vec<u8>>,
}

impl CpalPlayback {
    pub fn default_device() -> anyhow::Result<Self> {
        use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::anyhow!("no default output device"))?;

        let config = cpal::StreamConfig {
            channels: format::CHANNELS.get() as u16,
            sample_rate: cpal::SampleRate(format::SAMPLE_RATE_HZ.get()),
            buffer_size: cpal::BufferSize::Default,
        };

        let (tx, rx) = std::sync::mpsc::channel::<Vec<u8>>();
        let mut pending: Vec<i16> = Vec::new();

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [i16], _| fill_output(data, &mut pending, &rx),
            |err| log::warn!("output stream error: {err}"),
            None,
        )?;

        stream.play()?;

        Ok(Self { _stream: stream, tx })
    }
}

fn fill_output(data: &mut [i16], pending: &mut Vec<i16>, rx: &Receiver<Vec<u8>>) {
    while pending.len() < data.len() {
        match rx.try_recv() {
            Ok(bytes) => pending.extend(bytes.chunks_exact(2).map(|c| i16::from_le_bytes([c[0], c[1]]))),
            Err(_) => break,
        }
    }

    let take = pending.len().min(data.len());
    data[..take].copy_from_slice(&pending[..take]);
    data[take..].fill(0);
    pending.drain(..take);
}

impl PlaybackSink for CpalPlayback {
    fn play_frame(&mut self, frame: &[u8]) -> anyhow::Result<()> {
        self.tx
            .send(frame.to_vec())
            .map_err(|_| anyhow::anyhow!("playback stream disconnected"))
    }
}

/// A capture source that emits canonical-size silent frames at roughly the
/// canonical cadence, for exercising the client without any real audio
/// hardware.
pub struct SilentCapture;

impl CaptureSource for SilentCapture {
    fn next_frame(&mut self) -> anyhow::Result<Vec<u8>> {
        std::thread::sleep(std::time::Duration::from_millis(
            format::FRAME_DURATION_MS.get() as u64,
        ));
        Ok(vec![0u8; format::CANONICAL_FRAME_BYTES.get()])
    }
}

/// A playback sink that discards everything it's given.
pub struct DiscardPlayback;

impl PlaybackSink for DiscardPlayback {
    fn play_frame(&mut self, _frame: &[u8]) -> anyhow::Result<()> {
        Ok(())
    }
}
