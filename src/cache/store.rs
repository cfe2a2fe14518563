//! Cache Store Module
//!
//! Entry storage combining the key-to-sequence map with the expiration queue.
//! Both halves are always mutated together under the caller's single lock.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, Utc};

use crate::cache::{CacheStats, ExpirationQueue};

// == Sweep Step ==
/// Outcome of inspecting the oldest queue node once.
#[derive(Debug, PartialEq, Eq)]
pub enum SweepStep<K, V> {
    /// The queue is empty or its oldest node has not expired yet
    Done,
    /// The oldest node expired and its key's sequence was removed
    Evicted { key: K, values: Vec<V> },
    /// The oldest node expired but its key was already gone
    Stale,
}

// == Entry Store ==
/// Per-key sequences of values plus the arrival queue over their keys.
///
/// Invariant: a key present in `entries` has a non-empty sequence and exactly
/// one node in `queue`, carrying the timestamp of the sequence's first value.
#[derive(Debug)]
pub struct EntryStore<K, V> {
    /// Key to accumulated values, in insertion order
    entries: HashMap<K, Vec<V>>,
    /// First-insertion order of keys
    queue: ExpirationQueue<K>,
    /// Expiry counters
    stats: CacheStats,
    /// Initial capacity of sequences created by `insert_or_append`
    default_slice_size: usize,
}

impl<K, V> EntryStore<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a new empty store.
    ///
    /// # Arguments
    /// * `default_slice_size` - Capacity hint for new sequences (at least 1 is used)
    pub fn new(default_slice_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            queue: ExpirationQueue::new(),
            stats: CacheStats::new(),
            default_slice_size: default_slice_size.max(1),
        }
    }

    // == Insert Or Append ==
    /// Appends `value` to the key's sequence, creating the sequence and its
    /// queue node if the key is new.
    ///
    /// Returns true if the key was new.
    ///
    /// # Arguments
    /// * `key` - The key to accumulate under
    /// * `value` - The value to append
    /// * `timestamp` - Arrival time of `value`, recorded only for new keys
    pub fn insert_or_append(&mut self, key: K, value: V, timestamp: DateTime<Utc>) -> bool {
        match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                occupied.get_mut().push(value);
                false
            }
            Entry::Vacant(vacant) => {
                let mut values = Vec::with_capacity(self.default_slice_size);
                values.push(value);
                self.queue.push_front(vacant.key().clone(), timestamp);
                vacant.insert(values);
                true
            }
        }
    }

    // == Insert If Absent ==
    /// Claims the key with a single-value sequence unless it is already held.
    ///
    /// Returns true if the key was already present; the stored sequence is
    /// left untouched in that case.
    pub fn insert_if_absent(&mut self, key: K, value: V, timestamp: DateTime<Utc>) -> bool {
        match self.entries.entry(key) {
            Entry::Occupied(_) => true,
            Entry::Vacant(vacant) => {
                self.queue.push_front(vacant.key().clone(), timestamp);
                vacant.insert(vec![value]);
                false
            }
        }
    }

    // == Get ==
    /// Returns the key's accumulated values, oldest first.
    pub fn get(&self, key: &K) -> Option<&[V]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    // == Remove If Present ==
    /// Deletes the key's whole sequence, returning it.
    ///
    /// The queue node is not touched; the sweep consumes it on its own.
    pub fn remove_if_present(&mut self, key: &K) -> Option<Vec<V>> {
        self.entries.remove(key)
    }

    // == Expire Next ==
    /// Inspects the oldest queue node against `now`.
    ///
    /// An expired node is consumed unconditionally; its key's sequence is
    /// removed in the same call, so a given insertion can be evicted at most
    /// once.
    ///
    /// # Arguments
    /// * `ttl` - Maximum age of a key's first value
    /// * `now` - The instant to evaluate against
    pub fn expire_next(&mut self, ttl: chrono::Duration, now: DateTime<Utc>) -> SweepStep<K, V> {
        match self.queue.peek_oldest() {
            Some(node) if node.is_expired(ttl, now) => {}
            _ => return SweepStep::Done,
        }
        let Some(node) = self.queue.pop_oldest() else {
            return SweepStep::Done;
        };

        match self.remove_if_present(&node.key) {
            Some(values) => {
                self.stats.record_expiration();
                SweepStep::Evicted {
                    key: node.key,
                    values,
                }
            }
            None => SweepStep::Stale,
        }
    }

    // == Stats ==
    /// Returns current sizes and the expiry total.
    ///
    /// `pending_signals` is left at zero; the store cannot see the channel.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats;
        stats.set_sizes(self.entries.len(), self.queue.len());
        stats
    }

    // == Length ==
    /// Returns the number of keys currently holding a sequence.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of nodes in the expiration queue.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
