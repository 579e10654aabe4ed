//! The relay server binary: bring up logging, install a SIGINT-driven
//! shutdown flag, and run the acceptor until asked to stop.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .init();

    log::info!("confab relay server starting");

    let shutdown = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, shutdown.clone())
        .context("failed to install SIGINT handler")?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, shutdown.clone())
        .context("failed to install SIGTERM handler")?;

    confab_core::server::run(shutdown).context("relay server exited with an error")?;

    log::info!("confab relay server stopped");
    Ok(())
}
