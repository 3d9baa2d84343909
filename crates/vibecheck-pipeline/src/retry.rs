//! Retry with exponential back-off for provider calls.
//!
//! [`retry_with_backoff`] wraps any fallible async operation. The caller
//! supplies the predicate that decides which errors are worth another attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Attempt budget and back-off bounds.
///
/// With the defaults an operation that keeps failing is tried three times,
/// sleeping 1 s and then 2 s between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(16),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_app_config(config: &vibecheck_core::AppConfig) -> Self {
        Self {
            max_attempts: config.provider_max_attempts,
            base_delay: Duration::from_millis(config.provider_backoff_base_ms),
            max_delay: Duration::from_millis(config.provider_backoff_max_ms),
        }
    }

    /// Sleep before the attempt following failed attempt number `attempt`
    /// (1-based): `min(base * 2^(attempt-1), max)`.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// exhausts `policy.max_attempts`. The last error is returned on exhaustion.
///
/// # Errors
///
/// Returns the error from the final attempt.
pub async fn retry_with_backoff<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut operation: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_attempts || !is_retryable(&err) {
                    return Err(err);
                }
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "provider call failed, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
