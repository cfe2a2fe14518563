//! Expiration Engine Module
//!
//! The sweep: walks the expiration queue from its oldest end, evicting every
//! key whose first value has aged past the TTL, and hands each evicted
//! sequence to the expiration handler.

use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::cache::{CacheStats, EntryStore, SweepStep};

/// Callback receiving a key and every value accumulated for it.
pub type ExpirationHandler<K, V> = Arc<dyn Fn(K, Vec<V>) + Send + Sync>;

/// Callback receiving a periodic occupancy sample.
pub type InstrumentationHandler = Arc<dyn Fn(CacheStats) + Send + Sync>;

// == Expiration Engine ==
/// State shared between the public cache handle and its background tasks.
///
/// The store is guarded by a single mutex; the map and the queue inside it
/// are never locked separately.
pub struct ExpirationEngine<K, V> {
    store: Mutex<EntryStore<K, V>>,
    ttl: chrono::Duration,
    on_expiration: Option<ExpirationHandler<K, V>>,
}

impl<K, V> ExpirationEngine<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    // == Constructor ==
    /// Creates a new engine around an empty store.
    ///
    /// # Arguments
    /// * `ttl` - Maximum age of a key's first value
    /// * `default_slice_size` - Capacity hint for new sequences
    /// * `on_expiration` - Optional handler for evicted sequences
    pub fn new(
        ttl: chrono::Duration,
        default_slice_size: usize,
        on_expiration: Option<ExpirationHandler<K, V>>,
    ) -> Self {
        Self {
            store: Mutex::new(EntryStore::new(default_slice_size)),
            ttl,
            on_expiration,
        }
    }

    /// Returns the configured TTL.
    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Gives exclusive access to the store.
    pub(crate) fn store(&self) -> &Mutex<EntryStore<K, V>> {
        &self.store
    }

    // == Expire ==
    /// Sweeps the queue against `now` and returns how many keys were evicted.
    ///
    /// The lock is taken for one node at a time, so appends interleave with a
    /// long sweep. Handlers are spawned after the lock is released and are not
    /// awaited. Must be called from within a tokio runtime.
    pub async fn expire(&self, now: DateTime<Utc>) -> usize {
        let mut expired = 0;
        loop {
            let step = {
                let mut store = self.store.lock().await;
                store.expire_next(self.ttl, now)
            };

            match step {
                SweepStep::Done => break,
                SweepStep::Evicted { key, values } => {
                    expired += 1;
                    trace!(values = values.len(), "key expired");
                    self.notify(key, values);
                }
                SweepStep::Stale => trace!("skipping node of already evicted key"),
            }
        }

        if expired > 0 {
            debug!(expired, %now, "sweep evicted keys");
        }
        expired
    }

    // == Notify ==
    /// Runs the expiration handler on its own task.
    ///
    /// Runs concurrently with no ordering guarantee relative to subsequent
    /// cache operations. A panicking handler only takes down its own task.
    fn notify(&self, key: K, values: Vec<V>) {
        if let Some(handler) = &self.on_expiration {
            let handler = Arc::clone(handler);
            tokio::spawn(async move {
                handler(key, values);
            });
        }
    }
}
