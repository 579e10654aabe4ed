//! The relay client binary: connect to a relay, stream captured audio up,
//! and play whatever comes back down.

mod audio;

use std::net::TcpStream;
use std::thread;

use anyhow::Context;
use confab_proto::{read_frame, write_frame};

use audio::{CaptureSource, CpalCapture, CpalPlayback, DiscardPlayback, PlaybackSink, SilentCapture};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .init();

    let mut args = std::env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| "127.0.0.1:9797".to_string());
    let test_mode = args.next().as_deref() == Some("test");

    log::info!("connecting to {addr}");
    let stream = TcpStream::connect(&addr).with_context(|| format!("failed to connect to {addr}"))?;
    let write_half = stream.try_clone().context("failed to clone stream")?;
    let read_half = stream;

    let capture_handle = thread::spawn(move || -> anyhow::Result<()> {
        let mut write_half = write_half;
        let mut capture: Box<dyn CaptureSource> = if test_mode {
            Box::new(SilentCapture)
        } else {
            Box::new(CpalCapture::default_device()?)
        };

        loop {
            let frame = capture.next_frame()?;
            write_frame(&mut write_half, &frame)?;
        }
    });

    let playback_handle = thread::spawn(move || -> anyhow::Result<()> {
        let mut read_half = read_half;
        let mut playback: Box<dyn PlaybackSink> = if test_mode {
            Box::new(DiscardPlayback)
        } else {
            Box::new(CpalPlayback::default_device()?)
        };

        loop {
            let frame = read_frame(&mut read_half)?;
            playback.play_frame(&frame)?;
        }
    });

    match capture_handle.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::warn!("capture loop ended: {e}"),
        Err(panic) => log::warn!("capture thread panicked: {panic:?}"),
    }
    match playback_handle.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => log::warn!("playback loop ended: {e}"),
        Err(panic) => log::warn!("playback thread panicked: {panic:?}"),
    }

    Ok(())
}
