//! The global mixer: on a fixed cadence, mixes whatever arrived since the
//! last tick and fans the result out to every active client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::MIX_PERIOD;
use crate::frame::mix_frames;
use crate::inbox::Inbox;
use crate::registry::Registry;

/// Runs the mixer loop until `shutdown` is set.
///
/// Ticks are scheduled against a single monotonic `next_tick` instant rather
/// than a naive `sleep(MIX_PERIOD)` after each iteration, so the cadence
/// doesn't drift by the cost of the mix-and-fan-out work itself. If a tick
/// falls far enough behind (GC pause, loaded host, whatever), the loop skips
/// straight to the next future tick boundary instead of firing a burst of
/// back-to-back catch-up ticks.
///
/// A tick whose drained inbox is empty is a no-op beyond the sleep: nothing
/// is mixed and nothing is enqueued, so an idle relay doesn't flood every
/// connected client with silence every 20 ms.
pub fn run_mixer(inbox: Arc<Inbox>, registry: Arc<Registry>, shutdown: Arc<AtomicBool>) {
    let mut next_tick = Instant::now() + MIX_PERIOD;

    while !shutdown.load(Ordering::Acquire) {
        let now = Instant::now();
        if now < next_tick {
            std::thread::sleep(next_tick - now);
        }
        // If we're behind, this tick is the one catch-up tick for whichever
        // boundary we're behind on; the loop below after the tick work
        // collapses any further missed boundaries into a single jump instead
        // of firing one tick per missed period.

        let frames = inbox.drain();
        if !frames.is_empty() {
            let mixed = mix_frames(&frames);
            let shared = Arc::<[u8]>::from(mixed.into_boxed_slice());
            registry.enqueue_to_all(&shared);
        }

        next_tick += MIX_PERIOD;
        let now = Instant::now();
        while next_tick <= now {
            next_tick += MIX_PERIOD;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientEntry;
    use std::net::{TcpListener, TcpStream};

    fn loopback_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    #[test]
    fn one_tick_fans_out_to_all_active_clients() {
        let inbox = Arc::new(Inbox::new());
        let registry = Arc::new(Registry::new());

        let (_a_client, a_server) = loopback_pair();
        let (_b_client, b_server) = loopback_pair();
        let entry_a = Arc::new(ClientEntry::new(ClientEntry::issue_id(), a_server));
        let entry_b = Arc::new(ClientEntry::new(ClientEntry::issue_id(), b_server));
        registry.insert(entry_a.clone());
        registry.insert(entry_b.clone());

        inbox.push(Arc::from(vec![1u8, 2, 3, 4].into_boxed_slice()));

        let frames = inbox.drain();
        let mixed = mix_frames(&frames);
        let shared: Arc<[u8]> = Arc::from(mixed.into_boxed_slice());
        registry.enqueue_to_all(&shared);

        assert!(entry_a.wait_and_pop().is_some());
        assert!(entry_b.wait_and_pop().is_some());
    }

    #[test]
    fn empty_inbox_enqueues_nothing() {
        let inbox = Arc::new(Inbox::new());
        let registry = Arc::new(Registry::new());

        let (_client, server) = loopback_pair();
        let entry = Arc::new(ClientEntry::new(ClientEntry::issue_id(), server));
        registry.insert(entry.clone());

        let frames = inbox.drain();
        assert!(frames.is_empty());
        if !frames.is_empty() {
            let mixed = mix_frames(&frames);
            let shared: Arc<[u8]> = Arc::from(mixed.into_boxed_slice());
            registry.enqueue_to_all(&shared);
        }

        entry.deactivate();
        assert!(entry.wait_and_pop().is_none());
    }
}
