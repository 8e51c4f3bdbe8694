//! Cycle cache configuration types and defaults

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::cache;

/// Configuration for the cycle cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleCacheConfig {
    /// Snapshot age at which a family is refetched
    #[serde(with = "humantime_serde")]
    pub age_limit: Duration,
    /// Upper bound on a single metadata fetch
    #[serde(with = "humantime_serde")]
    pub fetch_timeout: Duration,
}

impl Default for CycleCacheConfig {
    fn default() -> Self {
        Self {
            age_limit: cache::DEFAULT_AGE_LIMIT,
            fetch_timeout: cache::DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl CycleCacheConfig {
    /// Set the age limit
    pub fn with_age_limit(mut self, age_limit: Duration) -> Self {
        self.age_limit = age_limit;
        self
    }

    /// Set the fetch timeout
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }
}
