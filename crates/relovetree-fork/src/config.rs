//! Configuration for staleness checks and batch scheduling

use crate::ForkError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the fork subsystem
///
/// # Examples
///
/// ```
/// use relovetree_fork::ForkConfig;
///
/// let config = ForkConfig::default();
/// assert_eq!(config.status_ttl_secs, 300);
/// assert_eq!(config.max_batch_size, 8);
///
/// // Check more often and in bigger batches
/// let config = ForkConfig::eager();
/// assert!(config.max_batch_size > 8);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForkConfig {
    /// How long a cached staleness result stays valid (seconds)
    /// Default: 300 (5 minutes)
    pub status_ttl_secs: u64,

    /// Quiet period after a view change before checks are dispatched (milliseconds)
    /// Default: 250
    pub debounce_ms: u64,

    /// Maximum candidates checked per dispatch, unless forced
    /// Default: 8
    pub max_batch_size: usize,

    /// Checks running at the same time within a batch
    /// Default: 3
    pub max_concurrency: usize,

    /// Upper bound on a single check (seconds)
    /// Default: 10
    pub check_timeout_secs: u64,
}

impl Default for ForkConfig {
    fn default() -> Self {
        Self {
            status_ttl_secs: 300,
            debounce_ms: 250,
            max_batch_size: 8,
            max_concurrency: 3,
            check_timeout_secs: 10,
        }
    }
}

impl ForkConfig {
    /// Short TTL and wider batches, for owners who sync often
    pub fn eager() -> Self {
        Self {
            status_ttl_secs: 60,
            debounce_ms: 150,
            max_batch_size: 16,
            max_concurrency: 4,
            check_timeout_secs: 10,
        }
    }

    /// Long TTL and narrow batches, for slow or metered connections
    pub fn relaxed() -> Self {
        Self {
            status_ttl_secs: 1800,
            debounce_ms: 500,
            max_batch_size: 4,
            max_concurrency: 2,
            check_timeout_secs: 20,
        }
    }

    /// Reject values that would stall or disable scheduling
    pub fn validate(&self) -> Result<(), ForkError> {
        if self.status_ttl_secs == 0 {
            return Err(ForkError::Config("status_ttl_secs must be positive".into()));
        }
        if self.max_batch_size == 0 {
            return Err(ForkError::Config("max_batch_size must be at least 1".into()));
        }
        if self.max_concurrency == 0 {
            return Err(ForkError::Config("max_concurrency must be at least 1".into()));
        }
        if self.check_timeout_secs == 0 {
            return Err(ForkError::Config("check_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// Get status TTL as Duration
    pub fn status_ttl(&self) -> Duration {
        Duration::from_secs(self.status_ttl_secs)
    }

    /// Get debounce window as Duration
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Get per-check timeout as Duration
    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ForkConfig::default();
        assert_eq!(config.status_ttl(), Duration::from_secs(300));
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.max_batch_size, 8);
        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.check_timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert!(ForkConfig::eager().status_ttl_secs < ForkConfig::default().status_ttl_secs);
        assert!(ForkConfig::relaxed().status_ttl_secs > ForkConfig::default().status_ttl_secs);
        assert!(ForkConfig::eager().validate().is_ok());
        assert!(ForkConfig::relaxed().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let config = ForkConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ForkError::Config(_))));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ForkConfig = toml::from_str("max_batch_size = 12").unwrap();
        assert_eq!(config.max_batch_size, 12);
        assert_eq!(config.debounce_ms, 250);
    }
}
