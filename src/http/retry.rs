//! Retry policy for idempotent calls

use crate::error::{Error, RetryCode};
use std::time::Duration;

/// Exponential backoff bounded by a total deadline
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound on a single delay
    pub max_backoff: Duration,
    /// Growth factor between consecutive delays
    pub multiplier: f64,
    /// Total time budget across all attempts
    pub deadline: Duration,
    /// Error classes that trigger a retry; empty disables retrying
    pub retry_codes: Vec<RetryCode>,
}

impl RetryPolicy {
    /// Policy retrying on the given classes
    pub fn new(
        initial_backoff: Duration,
        max_backoff: Duration,
        multiplier: f64,
        deadline: Duration,
        retry_codes: Vec<RetryCode>,
    ) -> Self {
        Self {
            initial_backoff,
            max_backoff,
            multiplier,
            deadline,
            retry_codes,
        }
    }

    /// Default policy of the idempotent sink and exclusion methods
    pub fn idempotent_default() -> Self {
        Self::new(
            Duration::from_millis(100),
            Duration::from_secs(60),
            1.3,
            Duration::from_secs(60),
            vec![
                RetryCode::DeadlineExceeded,
                RetryCode::Internal,
                RetryCode::Unavailable,
            ],
        )
    }

    /// Policy that never retries
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, 1.0, Duration::ZERO, Vec::new())
    }

    /// Whether this policy never retries
    pub fn is_disabled(&self) -> bool {
        self.retry_codes.is_empty()
    }

    /// Replace the overall deadline
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Whether `error` falls in a retryable class
    pub fn should_retry(&self, error: &Error) -> bool {
        error
            .retry_code()
            .is_some_and(|code| self.retry_codes.contains(&code))
    }

    /// Delay before retry number `attempt` (zero-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.min(i32::MAX as u32) as i32);
        let nanos = (self.initial_backoff.as_nanos() as f64 * factor).round();
        let delay = Duration::from_nanos(nanos.max(0.0) as u64);
        std::cmp::min(delay, self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::idempotent_default()
    }
}
