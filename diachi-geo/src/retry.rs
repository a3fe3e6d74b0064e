//! Exponential-backoff retry for flaky upstream calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use diachi_core::constants::{MAP_QUERY_BASE_DELAY, MAP_QUERY_MAX_ATTEMPTS};
use diachi_core::error::Result;

/// Retry schedule: `max_attempts` tries in total, sleeping `base_delay`,
/// `2 * base_delay`, `4 * base_delay`, ... between them.
///
/// Only [recoverable](diachi_core::GeoError::is_recoverable) errors are
/// retried; anything else is returned at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAP_QUERY_MAX_ATTEMPTS,
            base_delay: MAP_QUERY_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(1u32 << attempt.saturating_sub(1).min(16))
    }

    /// Runs `operation` until it succeeds, fails unrecoverably, or the
    /// attempts run out. Returns the last error in the latter cases.
    pub async fn run<T, F, Fut>(&self, label: &'static str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_recoverable() && attempt < self.max_attempts => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        label,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
