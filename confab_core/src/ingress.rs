//! Per-client reader thread: pulls frames off the wire and feeds the inbox.

use std::net::TcpStream;
use std::sync::Arc;
use std::thread::JoinHandle;

use confab_proto::read_frame;

use crate::client::ClientEntry;
use crate::inbox::Inbox;
use crate::registry::Registry;

/// Reads frames from `stream` until the peer disconnects or sends something
/// malformed, pushing each one into `inbox`. On exit for any reason it tears
/// the client down via `registry.remove` and joins the sender thread whose
/// handle it was given — the sender never joins itself, so ownership of its
/// handle has to live somewhere, and the reader outliving (or at worst
/// tying with) the sender makes it the natural owner.
pub fn run_reader(
    mut stream: TcpStream,
    entry: Arc<ClientEntry>,
    inbox: Arc<Inbox>,
    registry: Arc<Registry>,
    sender_handle: JoinHandle<()>,
) {
    loop {
        match read_frame(&mut stream) {
            Ok(payload) => inbox.push(Arc::from(payload.into_boxed_slice())),
            Err(e) => {
                log::debug!("client {:?} read loop ending: {e}", entry.id);
                break;
            }
        }
    }

    registry.remove(&entry);

    if let Err(panic) = sender_handle.join() {
        log::warn!("client {:?} sender thread panicked: {panic:?}", entry.id);
    }
}
