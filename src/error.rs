//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The value carries no timestamp, so it cannot be placed in time
    #[error("Value has no timestamp")]
    MissingTimestamp,

    /// Construction parameters were rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The background sweeper is gone and can no longer receive timestamps
    #[error("Expiration channel closed")]
    ChannelClosed,

    /// The cache was built outside of a tokio runtime
    #[error("No tokio runtime available to run background tasks")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
