//! Bounded exponential-backoff retry over transient failures.
//!
//! Only errors reporting [`IntError::is_retryable`] are retried; everything
//! else propagates immediately. When the attempt budget runs out the last
//! cause is surfaced inside [`IntError::RetryExhausted`].

use crate::error::{IntError, IntResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry budget and backoff configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay_ms: u64,
    /// Upper bound on any single delay.
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// Returns the backoff delay after the given failed attempt (1-based).
    ///
    /// Doubles per attempt, capped at `max_delay_ms`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(32);
        let ms = self.base_delay_ms.saturating_mul(factor);
        Duration::from_millis(ms.min(self.max_delay_ms))
    }

    /// Runs `operation` until it succeeds, fails terminally, or the
    /// attempt budget runs out.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut f: F) -> IntResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = IntResult<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_cause = String::new();

        for attempt in 1..=attempts {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, backing off before retry"
                    );
                    last_cause = err.to_string();
                    tokio::time::sleep(delay).await;
                }
                Err(err) if err.is_retryable() => {
                    last_cause = err.to_string();
                }
                Err(err) => return Err(err),
            }
        }

        Err(IntError::RetryExhausted {
            operation: operation.to_string(),
            attempts,
            last: last_cause,
        })
    }
}
