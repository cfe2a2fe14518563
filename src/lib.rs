//! Slice Cache TTL - An accumulating in-memory TTL cache
//!
//! Appends timestamped values under keys and flushes each key's whole
//! sequence to a handler once its oldest value outlives the TTL.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, SliceCacheTtl, SliceCacheTtlBuilder, Timestamped};
pub use config::Config;
pub use error::{CacheError, Result};
