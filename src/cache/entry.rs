//! Cache Entry Module
//!
//! Defines what a cached value must expose and the per-key queue marker.

use std::sync::Arc;

use chrono::{DateTime, Utc};

// == Timestamped ==
/// A value that knows its own logical arrival time.
///
/// The cache only ever asks a value for its timestamp; everything else about
/// the value is opaque. Returning `None` marks a value that has not been
/// stamped yet, which the insertion operations reject.
pub trait Timestamped {
    /// Returns the logical arrival time of this value.
    fn arrived_at(&self) -> Option<DateTime<Utc>>;
}

impl Timestamped for DateTime<Utc> {
    fn arrived_at(&self) -> Option<DateTime<Utc>> {
        Some(*self)
    }
}

impl<T: Timestamped + ?Sized> Timestamped for Arc<T> {
    fn arrived_at(&self) -> Option<DateTime<Utc>> {
        (**self).arrived_at()
    }
}

impl<T: Timestamped> Timestamped for Option<T> {
    fn arrived_at(&self) -> Option<DateTime<Utc>> {
        self.as_ref().and_then(Timestamped::arrived_at)
    }
}

// == Queue Node ==
/// Marker for one tracked key in the expiration queue.
///
/// Created only when the key is first inserted, so `timestamp` is the
/// timestamp of the earliest value in the key's sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueNode<K> {
    /// The tracked key
    pub key: K,
    /// Timestamp of the first value inserted for `key`
    pub timestamp: DateTime<Utc>,
}

impl<K> QueueNode<K> {
    /// Creates a new queue node.
    pub fn new(key: K, timestamp: DateTime<Utc>) -> Self {
        Self { key, timestamp }
    }

    // == Is Expired ==
    /// Checks whether the node has aged past `ttl` at instant `now`.
    ///
    /// Boundary condition: a node expires once `timestamp + ttl` is no longer
    /// after `now`, so a node is already expired at exactly `timestamp + ttl`.
    /// A deadline that overflows the calendar never expires.
    pub fn is_expired(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        match self.timestamp.checked_add_signed(ttl) {
            Some(deadline) => deadline <= now,
            None => false,
        }
    }
}
