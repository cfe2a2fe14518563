//! Cache Module
//!
//! Provides the accumulating TTL cache: per-key value sequences, the
//! arrival-ordered expiration queue, and the sweep that flushes stale keys.

mod builder;
mod coordinator;
mod engine;
mod entry;
mod queue;
mod stats;
mod store;


// Re-export public types
pub use builder::SliceCacheTtlBuilder;
pub use coordinator::SliceCacheTtl;
pub use engine::{ExpirationEngine, ExpirationHandler, InstrumentationHandler};
pub use entry::{QueueNode, Timestamped};
pub use queue::ExpirationQueue;
pub use stats::CacheStats;
pub use store::{EntryStore, SweepStep};
