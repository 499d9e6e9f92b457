//! Drain-on-read log of transfer outcomes
//!
//! Workers append one outcome per processed transfer; a single consumer
//! (a notification or polling layer) takes everything buffered so far with
//! [`StatusLog::drain`].

use crate::types::TransferOutcome;
use parking_lot::Mutex;

/// Unbounded buffer of outcomes
///
/// Appends never block on anything but the short critical section that
/// pushes onto the buffer. Outcomes from one shard keep the order in which
/// their transfers were applied; outcomes from different shards interleave
/// arbitrarily.
#[derive(Debug, Default)]
pub struct StatusLog {
    entries: Mutex<Vec<TransferOutcome>>,
}

impl StatusLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Append an outcome
    pub fn append(&self, outcome: TransferOutcome) {
        self.entries.lock().push(outcome);
    }

    /// Take every buffered outcome, leaving the log empty
    ///
    /// Snapshot-and-clear: outcomes appended after the snapshot stay in the
    /// log for the next drain. Returns an empty vector when nothing is pending.
    pub fn drain(&self) -> Vec<TransferOutcome> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Number of buffered outcomes
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether no outcome is buffered
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
