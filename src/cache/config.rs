//! Cache configuration.

use std::time::Duration;

use serde::Deserialize;

const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Cache behavior from `vitrine.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Upper bound on any remote round trip, in milliseconds. Expiry is
    /// surfaced as a fetch failure.
    pub fetch_timeout_ms: u64,
    /// Keep the previously cached collections visible when a fetch fails.
    /// When false, a failure wipes them and only the error remains.
    pub stale_if_error: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            stale_if_error: true,
        }
    }
}

impl CacheConfig {
    /// Fetch timeout as a `Duration`, clamping zero to one millisecond.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms.max(1))
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            fetch_timeout_ms: settings.fetch_timeout_ms,
            stale_if_error: settings.stale_if_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert_eq!(config.fetch_timeout_ms, 10_000);
        assert!(config.stale_if_error);
    }

    #[test]
    fn zero_timeout_clamps_to_one_millisecond() {
        let config = CacheConfig {
            fetch_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.fetch_timeout(), Duration::from_millis(1));
    }
}
