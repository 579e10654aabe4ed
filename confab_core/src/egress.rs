//! Per-client sender thread: drains the client's outgoing queue onto the wire.

use std::net::TcpStream;
use std::sync::Arc;

use confab_proto::write_frame;

use crate::client::ClientEntry;
use crate::registry::Registry;

/// Waits for frames on `entry`'s queue and writes each one to `stream`, until
/// either the entry is torn down from elsewhere (in which case
/// `wait_and_pop` returns `None` once the queue is drained) or a write fails.
///
/// A write failure means *this* thread discovered the disconnect, so it tears
/// the entry down itself — but unlike the reader, it never joins anything: its
/// own handle is owned by the reader, and joining would deadlock if the two
/// raced to call `remove` at the same moment.
pub fn run_sender(mut stream: TcpStream, entry: Arc<ClientEntry>, registry: Arc<Registry>) {
    while let Some(frame) = entry.wait_and_pop() {
        if let Err(e) = write_frame(&mut stream, &frame) {
            log::debug!("client {:?} write loop ending: {e}", entry.id);
            registry.remove(&entry);
            return;
        }
    }
}
