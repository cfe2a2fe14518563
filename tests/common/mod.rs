//! Shared helpers for integration tests

use chrono::{DateTime, Utc};
use slice_cache_ttl::Timestamped;
use tracing_subscriber::EnvFilter;

/// A keyed event carrying its own arrival time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestEvent {
    pub key: i32,
    pub value: i32,
    pub ts: DateTime<Utc>,
}

impl TestEvent {
    pub fn new(key: i32, value: i32, ts: DateTime<Utc>) -> Self {
        Self { key, value, ts }
    }
}

impl Timestamped for TestEvent {
    fn arrived_at(&self) -> Option<DateTime<Utc>> {
        Some(self.ts)
    }
}

/// Routes cache logs to the test output; RUST_LOG controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
