//! Cache Handle Module
//!
//! The public face of the cache: insertion, lookup and forced expiry, all
//! funnelled through the engine's single lock and the timestamp delivery
//! channel.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::cache::{CacheStats, ExpirationEngine, SliceCacheTtlBuilder, Timestamped};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks;

// == Slice Cache TTL ==
/// A TTL cache that accumulates timestamped values per key.
///
/// Each key maps to the values appended under it, in order. Once the key's
/// first value is older than the TTL, the whole sequence is removed and
/// passed to the expiration handler.
///
/// Expiry is evaluated by a background task each time a timestamp reaches it,
/// either from the periodic clock or from an insertion. Dropping the cache
/// stops its background tasks.
pub struct SliceCacheTtl<K, V> {
    /// Store, TTL and handler shared with the background tasks
    engine: Arc<ExpirationEngine<K, V>>,
    /// Sending half of the bounded timestamp delivery channel
    signals: mpsc::Sender<DateTime<Utc>>,
    /// Background tasks owned by this instance
    tasks: Vec<JoinHandle<()>>,
}

impl<K, V> SliceCacheTtl<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Timestamped + Send + 'static,
{
    // == Constructors ==
    /// Returns a builder for a cache with the given TTL and default options.
    pub fn builder(ttl: Duration) -> SliceCacheTtlBuilder<K, V> {
        SliceCacheTtlBuilder::from_config(Config {
            ttl,
            ..Config::default()
        })
    }

    /// Creates a cache that discards expired data.
    ///
    /// # Arguments
    /// * `ttl` - Maximum age of a key's first value
    /// * `max_resolution` - Tick interval of the built-in clock
    pub fn simple(ttl: Duration, max_resolution: Duration) -> Result<Self> {
        Self::builder(ttl).max_resolution(max_resolution).build()
    }

    /// Creates a cache that hands expired sequences to `handler`.
    ///
    /// # Arguments
    /// * `handler` - Invoked on its own task with each expired key and values
    /// * `ttl` - Maximum age of a key's first value
    /// * `max_resolution` - Tick interval of the built-in clock
    pub fn with_expiration_handler<F>(
        handler: F,
        ttl: Duration,
        max_resolution: Duration,
    ) -> Result<Self>
    where
        F: Fn(K, Vec<V>) + Send + Sync + 'static,
    {
        Self::builder(ttl)
            .max_resolution(max_resolution)
            .on_expiration(handler)
            .build()
    }

    /// Creates a cache from a loaded configuration, without handlers.
    pub fn from_config(config: &Config) -> Result<Self> {
        SliceCacheTtlBuilder::from_config(config.clone()).build()
    }

    pub(crate) fn from_parts(
        engine: Arc<ExpirationEngine<K, V>>,
        signals: mpsc::Sender<DateTime<Utc>>,
        tasks: Vec<JoinHandle<()>>,
    ) -> Self {
        Self {
            engine,
            signals,
            tasks,
        }
    }

    // == Append ==
    /// Appends `value` to the key's sequence, starting a new one if needed.
    ///
    /// The value is visible to `get` before its timestamp is queued for the
    /// sweeper; if the delivery channel is full this call waits for room.
    ///
    /// # Errors
    /// `MissingTimestamp` if the value has no timestamp; nothing is stored.
    pub async fn append(&self, key: K, value: V) -> Result<()> {
        let timestamp = value.arrived_at().ok_or(CacheError::MissingTimestamp)?;
        self.engine
            .store()
            .lock()
            .await
            .insert_or_append(key, value, timestamp);
        self.tick(timestamp).await
    }

    // == Check And Lock ==
    /// Claims `key` for one TTL window.
    ///
    /// Returns false if the key was free and is now held with `value`, true if
    /// someone already holds it (the stored sequence is left untouched).
    ///
    /// # Errors
    /// `MissingTimestamp` if the value has no timestamp; nothing is stored.
    pub async fn check_and_lock(&self, key: K, value: V) -> Result<bool> {
        let timestamp = value.arrived_at().ok_or(CacheError::MissingTimestamp)?;
        let locked = self
            .engine
            .store()
            .lock()
            .await
            .insert_if_absent(key, value, timestamp);
        self.tick(timestamp).await?;
        Ok(locked)
    }

    // == Tick ==
    /// Queues a sweep against `now` without inserting anything.
    ///
    /// Waits while the delivery channel is full.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<()> {
        self.signals.send(now).await.map_err(|_| {
            warn!("Expiration channel closed, timestamp dropped");
            CacheError::ChannelClosed
        })
    }

    // == Get ==
    /// Returns a copy of the key's values, oldest first.
    pub async fn get(&self, key: &K) -> Option<Vec<V>>
    where
        V: Clone,
    {
        self.engine.store().lock().await.get(key).map(<[V]>::to_vec)
    }

    // == Expire All ==
    /// Sweeps as if `2 * ttl` had passed, expiring every tracked key.
    ///
    /// Returns the number of keys evicted.
    pub async fn expire_all(&self) -> usize {
        let horizon = self.engine.ttl() * 2;
        let now = Utc::now()
            .checked_add_signed(horizon)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.engine.expire(now).await
    }

    // == Expire Custom ==
    /// Sweeps as if `ahead` had passed since now.
    ///
    /// Returns the number of keys evicted.
    pub async fn expire_custom(&self, ahead: Duration) -> usize {
        let now = chrono::Duration::from_std(ahead)
            .ok()
            .and_then(|ahead| Utc::now().checked_add_signed(ahead))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.engine.expire(now).await
    }

    // == Stats ==
    /// Returns the same sample the instrumentation hook receives.
    pub async fn stats(&self) -> CacheStats {
        tasks::sample(self.engine.as_ref(), &self.signals).await
    }

    // == Length ==
    /// Returns the number of keys currently holding values.
    pub async fn len(&self) -> usize {
        self.engine.store().lock().await.len()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.engine.store().lock().await.is_empty()
    }
}

impl<K, V> Drop for SliceCacheTtl<K, V> {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}
