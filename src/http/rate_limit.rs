//! Client-side throttling
//!
//! Keeps a client under the service's configuration-write quota. Built on a
//! governor token bucket shared by every clone of the client.

use crate::error::{Error, Result};
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

type DirectLimiter = Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Throttle settings, as found under `rate_limit:` in an options file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimiterConfig {
    /// Sustained calls per second
    pub requests_per_second: u32,
    /// Calls admitted back to back before throttling starts
    #[serde(default = "default_burst")]
    pub burst_size: u32,
}

fn default_burst() -> u32 {
    10
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: default_burst(),
        }
    }
}

impl RateLimiterConfig {
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    /// Governor quota; zero values are raised to one
    fn quota(&self) -> Quota {
        let rate = NonZeroU32::new(self.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(self.burst_size).unwrap_or(NonZeroU32::MIN);
        Quota::per_second(rate).allow_burst(burst)
    }
}

/// Token bucket shared across clones
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<DirectLimiter>,
    config: RateLimiterConfig,
}

impl RateLimiter {
    pub fn new(config: &RateLimiterConfig) -> Self {
        Self {
            limiter: Arc::new(Governor::direct(config.quota())),
            config: *config,
        }
    }

    /// Take a permit if one is free right now
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Wait for a permit
    ///
    /// Waiting counts against the attempt's timeout: when `budget` runs out
    /// before a permit frees up the call fails with `Error::Timeout`.
    pub async fn acquire(&self, budget: Option<Duration>) -> Result<()> {
        if self.try_acquire() {
            return Ok(());
        }
        debug!(
            requests_per_second = self.config.requests_per_second,
            "Throttling call"
        );

        match budget {
            None => {
                self.limiter.until_ready().await;
                Ok(())
            }
            Some(budget) => tokio::time::timeout(budget, self.limiter.until_ready())
                .await
                .map_err(|_| Error::Timeout {
                    timeout_ms: budget.as_millis() as u64,
                }),
        }
    }

    pub fn config(&self) -> &RateLimiterConfig {
        &self.config
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;

    #[test]
    fn test_yaml_burst_default() {
        let config: RateLimiterConfig = serde_yaml::from_str("requests_per_second: 3").unwrap();
        assert_eq!(config, RateLimiterConfig::new(3, 10));
    }

    #[tokio::test]
    async fn test_burst_then_throttle() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(1, 3));

        for _ in 0..3 {
            assert!(limiter.try_acquire());
        }
        assert!(!limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_zero_config_still_admits() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(0, 0));
        assert!(limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_acquire_within_budget() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(100, 1));

        limiter.acquire(None).await.unwrap();
        limiter
            .acquire(Some(Duration::from_millis(500)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_acquire_times_out_when_throttled() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(1, 1));
        assert!(limiter.try_acquire());

        let err = limiter
            .acquire(Some(Duration::from_millis(20)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { timeout_ms: 20 }));
    }

    #[test]
    fn test_clones_share_bucket() {
        let limiter = RateLimiter::new(&RateLimiterConfig::new(1, 1));
        let clone = limiter.clone();

        assert!(limiter.try_acquire());
        assert!(!clone.try_acquire());
        assert_eq!(clone.config().burst_size, 1);
    }
}
