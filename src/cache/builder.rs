//! Cache Builder Module
//!
//! Collects construction options, validates them and starts the background
//! tasks of a new cache.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::info;

use crate::cache::{
    CacheStats, ExpirationEngine, ExpirationHandler, InstrumentationHandler, SliceCacheTtl,
    Timestamped,
};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_forwarder, spawn_instrumentation, spawn_sweeper, spawn_ticker};

// == Builder ==
/// Builder for [`SliceCacheTtl`].
///
/// # Example
/// ```ignore
/// let cache = SliceCacheTtl::builder(Duration::from_millis(200))
///     .max_resolution(Duration::from_millis(10))
///     .on_expiration(|key: u32, values: Vec<Event>| flush(key, values))
///     .build()?;
/// ```
pub struct SliceCacheTtlBuilder<K, V> {
    config: Config,
    on_expiration: Option<ExpirationHandler<K, V>>,
    on_instrumentation: Option<InstrumentationHandler>,
    tick_source: Option<mpsc::Receiver<DateTime<Utc>>>,
}

impl<K, V> SliceCacheTtlBuilder<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Timestamped + Send + 'static,
{
    /// Starts from an existing configuration.
    pub fn from_config(config: Config) -> Self {
        Self {
            config,
            on_expiration: None,
            on_instrumentation: None,
            tick_source: None,
        }
    }

    /// Sets the tick interval of the built-in clock.
    pub fn max_resolution(mut self, resolution: Duration) -> Self {
        self.config.max_resolution = resolution;
        self
    }

    /// Sets the handler invoked with every expired key and its values.
    pub fn on_expiration<F>(mut self, handler: F) -> Self
    where
        F: Fn(K, Vec<V>) + Send + Sync + 'static,
    {
        self.on_expiration = Some(Arc::new(handler));
        self
    }

    /// Sets the periodic occupancy hook.
    pub fn on_instrumentation<F>(mut self, handler: F) -> Self
    where
        F: Fn(CacheStats) + Send + Sync + 'static,
    {
        self.on_instrumentation = Some(Arc::new(handler));
        self
    }

    /// Sets how often the occupancy hook is called.
    pub fn instrumentation_interval(mut self, interval: Duration) -> Self {
        self.config.instrumentation_interval = interval;
        self
    }

    /// Sets the initial capacity of new sequences.
    pub fn default_slice_size(mut self, size: usize) -> Self {
        self.config.default_slice_size = size;
        self
    }

    /// Sets the delivery channel capacity. Inserts block once it is full.
    pub fn expiration_chan_size(mut self, size: usize) -> Self {
        self.config.expiration_chan_size = size;
        self
    }

    /// Replaces the built-in clock with caller-supplied timestamps.
    ///
    /// Every instant received on `source` is forwarded to the sweeper as if it
    /// were the current time.
    pub fn tick_source(mut self, source: mpsc::Receiver<DateTime<Utc>>) -> Self {
        self.tick_source = Some(source);
        self
    }

    // == Build ==
    /// Validates the options and starts the cache's background tasks.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Result<SliceCacheTtl<K, V>> {
        self.config.validate()?;
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(CacheError::NoRuntime);
        }

        let ttl = chrono::Duration::from_std(self.config.ttl)
            .map_err(|e| CacheError::InvalidConfig(e.to_string()))?;
        let (signals, receiver) = mpsc::channel(self.config.expiration_chan_size);
        let engine = Arc::new(ExpirationEngine::new(
            ttl,
            self.config.default_slice_size,
            self.on_expiration,
        ));

        let mut tasks = vec![spawn_sweeper(Arc::clone(&engine), receiver)];
        tasks.push(match self.tick_source {
            Some(source) => spawn_forwarder(source, signals.clone()),
            None => spawn_ticker(signals.clone(), self.config.max_resolution),
        });
        if let Some(handler) = self.on_instrumentation {
            tasks.push(spawn_instrumentation(
                Arc::clone(&engine),
                signals.clone(),
                self.config.instrumentation_interval,
                handler,
            ));
        }

        info!(
            "Cache started: ttl={:?}, max_resolution={:?}, expiration_chan_size={}",
            self.config.ttl, self.config.max_resolution, self.config.expiration_chan_size
        );

        Ok(SliceCacheTtl::from_parts(engine, signals, tasks))
    }
}
