//! Configuration Module
//!
//! Handles loading and validating cache construction parameters.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Initial capacity of a new entry sequence created by `append`
pub const DEFAULT_SLICE_SIZE: usize = 20;

/// Capacity of the timestamp delivery channel
pub const DEFAULT_EXPIRATION_CHAN_SIZE: usize = 10_000;

/// Cache construction parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Age after which a key's oldest value makes the whole key expire
    pub ttl: Duration,
    /// Tick interval of the periodic timestamp source
    pub max_resolution: Duration,
    /// Capacity hint for a new entry sequence
    pub default_slice_size: usize,
    /// Capacity of the timestamp delivery channel (back-pressure threshold)
    pub expiration_chan_size: usize,
    /// Sampling period of the instrumentation hook
    pub instrumentation_interval: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL_MS` - TTL in milliseconds (default: 60000)
    /// - `CACHE_MAX_RESOLUTION_MS` - Tick interval in milliseconds (default: 1000)
    /// - `CACHE_DEFAULT_SLICE_SIZE` - Entry sequence capacity hint (default: 20)
    /// - `CACHE_EXPIRATION_CHAN_SIZE` - Delivery channel capacity (default: 10000)
    /// - `CACHE_INSTRUMENTATION_INTERVAL_MS` - Sampling period in milliseconds (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl: env_millis("CACHE_TTL_MS").unwrap_or(defaults.ttl),
            max_resolution: env_millis("CACHE_MAX_RESOLUTION_MS")
                .unwrap_or(defaults.max_resolution),
            default_slice_size: env::var("CACHE_DEFAULT_SLICE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_slice_size),
            expiration_chan_size: env::var("CACHE_EXPIRATION_CHAN_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.expiration_chan_size),
            instrumentation_interval: env_millis("CACHE_INSTRUMENTATION_INTERVAL_MS")
                .unwrap_or(defaults.instrumentation_interval),
        }
    }

    // == Validate ==
    /// Checks that the parameters can actually drive a cache.
    ///
    /// Zero durations would spin the background tasks, and a zero-capacity
    /// bounded channel cannot be created.
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidConfig("ttl must be non-zero".to_string()));
        }
        if chrono::Duration::from_std(self.ttl.saturating_mul(2)).is_err() {
            return Err(CacheError::InvalidConfig(format!(
                "ttl {:?} is out of range",
                self.ttl
            )));
        }
        if self.max_resolution.is_zero() {
            return Err(CacheError::InvalidConfig(
                "max_resolution must be non-zero".to_string(),
            ));
        }
        if self.instrumentation_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "instrumentation_interval must be non-zero".to_string(),
            ));
        }
        if self.expiration_chan_size == 0 {
            return Err(CacheError::InvalidConfig(
                "expiration_chan_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_resolution: Duration::from_secs(1),
            default_slice_size: DEFAULT_SLICE_SIZE,
            expiration_chan_size: DEFAULT_EXPIRATION_CHAN_SIZE,
            instrumentation_interval: Duration::from_secs(1),
        }
    }
}

fn env_millis(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.ttl, Duration::from_secs(60));
        assert_eq!(config.max_resolution, Duration::from_secs(1));
        assert_eq!(config.default_slice_size, 20);
        assert_eq!(config.expiration_chan_size, 10_000);
        assert_eq!(config.instrumentation_interval, Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env() {
        env::set_var("CACHE_TTL_MS", "250");
        env::set_var("CACHE_MAX_RESOLUTION_MS", "not-a-number");
        env::remove_var("CACHE_DEFAULT_SLICE_SIZE");
        env::set_var("CACHE_EXPIRATION_CHAN_SIZE", "16");
        env::remove_var("CACHE_INSTRUMENTATION_INTERVAL_MS");

        let config = Config::from_env();
        assert_eq!(config.ttl, Duration::from_millis(250));
        assert_eq!(config.max_resolution, Duration::from_secs(1));
        assert_eq!(config.default_slice_size, 20);
        assert_eq!(config.expiration_chan_size, 16);
        assert_eq!(config.instrumentation_interval, Duration::from_secs(1));

        env::remove_var("CACHE_TTL_MS");
        env::remove_var("CACHE_MAX_RESOLUTION_MS");
        env::remove_var("CACHE_EXPIRATION_CHAN_SIZE");
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = Config {
            ttl: Duration::ZERO,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));

        let config = Config {
            max_resolution: Duration::ZERO,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));

        let config = Config {
            expiration_chan_size: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));

        let config = Config {
            instrumentation_interval: Duration::ZERO,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_huge_ttl() {
        let config = Config {
            ttl: Duration::MAX,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_slice_size_is_allowed() {
        let config = Config {
            default_slice_size: 0,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }
}
