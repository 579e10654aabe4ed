//! A single connected client's identity and outgoing-frame queue.

use std::collections::VecDeque;
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Condvar, Mutex};

use crate::config::QUEUE_CAPACITY;
use crate::frame::SharedFrame;

/// Identifies a client for the lifetime of its connection. Never reused, even
/// after the client disconnects and a new one takes its place in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// The mixer's fan-out target and the bookkeeping around it.
///
/// `queue` and `cond` together form the sender thread's wait/wake pair: the
/// mixer (or any ingress thread tearing this entry down) pushes a frame and
/// notifies, and the sender wakes, pops, and writes. `active` is the single
/// source of truth for whether this entry is still live; once it flips from
/// `true` to `false` the transition is one-way; see [`crate::registry::Registry::remove`].
pub struct ClientEntry {
    pub id: ClientId,
    queue: Mutex<VecDeque<SharedFrame>>,
    cond: Condvar,
    active: AtomicBool,
    /// A handle used purely to force the socket closed from outside the
    /// thread that owns the "real" read/write handles, so a stuck peer can't
    /// block teardown.
    shutdown_handle: TcpStream,
}

impl ClientEntry {
    pub fn new(id: ClientId, shutdown_handle: TcpStream) -> Self {
        Self {
            id,
            queue: Mutex::new(VecDeque::with_capacity(QUEUE_CAPACITY)),
            cond: Condvar::new(),
            active: AtomicBool::new(true),
            shutdown_handle,
        }
    }

    pub fn issue_id() -> ClientId {
        ClientId::next()
    }

    /// Pushes `frame` onto this client's outgoing queue, dropping the oldest
    /// queued frame first if the queue is already at capacity. Wakes the
    /// sender thread.
    pub fn enqueue(&self, frame: SharedFrame) {
        let mut queue = self.queue.lock().unwrap();
        if queue.len() >= QUEUE_CAPACITY {
            queue.pop_front();
        }
        queue.push_back(frame);
        self.cond.notify_all();
    }

    /// Blocks until a frame is available or the entry has been torn down,
    /// then pops and returns it. Returns `None` once inactive and drained.
    pub fn wait_and_pop(&self) -> Option<SharedFrame> {
        let mut queue = self.queue.lock().unwrap();
        loop {
            if let Some(frame) = queue.pop_front() {
                return Some(frame);
            }
            if !self.active.load(Ordering::Acquire) {
                return None;
            }
            queue = self.cond.wait(queue).unwrap();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Idempotently tears this entry down: flips `active` from `true` to
    /// `false`, shuts down the socket, drains the queue, and wakes anyone
    /// waiting on it. Returns `true` only to the caller that won the
    /// transition; every subsequent call is a silent no-op.
    pub fn deactivate(&self) -> bool {
        if self
            .active
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let _ = self.shutdown_handle.shutdown(std::net::Shutdown::Both);
        self.queue.lock().unwrap().clear();
        self.cond.notify_all();
        true
    }
}
