//! The mixer's single point of intake: every client's most recently received
//! frame, waiting to be picked up on the next mixer tick.

use std::sync::Mutex;

use crate::frame::SharedFrame;

/// A plain accumulator, not a queue: between mixer ticks, every ingress
/// thread that receives a frame pushes it here, and the mixer drains the
/// whole batch at once. Nothing about ordering across clients matters, since
/// the mixer sums everything it drains into a single output frame.
#[derive(Default)]
pub struct Inbox {
    pending: Mutex<Vec<SharedFrame>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, frame: SharedFrame) {
        self.pending.lock().unwrap().push(frame);
    }

    /// Takes everything accumulated since the last drain, leaving the inbox
    /// empty for the next tick.
    pub fn drain(&self) -> Vec<SharedFrame> {
        std::mem::take(&mut *self.pending.lock().unwrap())
    }
}
