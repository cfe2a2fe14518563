//! Cache Statistics Module
//!
//! Point-in-time sample of the cache's internal sizes, handed to the
//! instrumentation hook.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache occupancy and expiry progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of keys currently holding a sequence
    pub total_entries: usize,
    /// Number of nodes in the expiration queue
    pub queue_len: usize,
    /// Timestamps waiting in the delivery channel
    pub pending_signals: usize,
    /// Running total of keys evicted by the sweep
    pub expired: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Expiration ==
    /// Increments the expired counter.
    pub fn record_expiration(&mut self) {
        self.expired += 1;
    }

    // == Update Sizes ==
    /// Updates the entry and queue sizes.
    pub fn set_sizes(&mut self, total_entries: usize, queue_len: usize) {
        self.total_entries = total_entries;
        self.queue_len = queue_len;
    }

    /// Sets the number of undelivered timestamps.
    pub fn set_pending_signals(&mut self, pending: usize) {
        self.pending_signals = pending;
    }
}
