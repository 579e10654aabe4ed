//! The set of currently-connected clients.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::client::{ClientEntry, ClientId};
use crate::frame::SharedFrame;

/// Lock ordering: code holding the registry lock may additionally take an
/// entry's own queue lock, but never the reverse. An entry's queue lock
/// released before a registry operation is acquired is how [`Registry::remove`]
/// avoids deadlocking with [`Registry::for_each_active`].
#[derive(Default)]
pub struct Registry {
    entries: Mutex<HashMap<ClientId, Arc<ClientEntry>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, entry: Arc<ClientEntry>) {
        self.entries.lock().unwrap().insert(entry.id, entry);
    }

    /// Runs `f` for every currently-active entry, holding the registry lock
    /// for the whole pass. The per-entry work this is used for (queueing a
    /// mixed frame) only ever takes the entry's own queue lock, which is
    /// always safe to acquire while already holding the registry lock.
    pub fn for_each_active(&self, mut f: impl FnMut(&Arc<ClientEntry>)) {
        let entries = self.entries.lock().unwrap();
        for entry in entries.values() {
            if entry.is_active() {
                f(entry);
            }
        }
    }

    /// Idempotently removes and tears down `entry`. Only the caller that wins
    /// the entry's active->inactive transition unlinks it from the map;
    /// every other concurrent caller is a no-op, matching `ClientEntry::deactivate`'s
    /// own idempotence.
    pub fn remove(&self, entry: &Arc<ClientEntry>) -> bool {
        let won = entry.deactivate();
        if won {
            self.entries.lock().unwrap().remove(&entry.id);
        }
        won
    }

    /// A point-in-time snapshot of every entry, active or not. Used only
    /// during shutdown, where the lifecycle controller needs to tear down and
    /// join every client without racing new inserts (the acceptor has already
    /// stopped accepting by the time this is called).
    pub fn snapshot(&self) -> Vec<Arc<ClientEntry>> {
        self.entries.lock().unwrap().values().cloned().collect()
    }

    pub fn enqueue_to_all(&self, frame: &SharedFrame) {
        self.for_each_active(|entry| entry.enqueue(frame.clone()));
    }
}
