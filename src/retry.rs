use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use crate::error::{AiError, ConfigError};
use crate::metrics::{AI_CALLS_TOTAL, AI_FAILURES_TOTAL, AI_RETRIES_TOTAL, RATE_LIMIT_WAIT};
use crate::rate_limit::RateLimiter;

// Bounded retry with linear backoff (retry_delay * attempt)
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: u32,
    retry_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Result<Self, ConfigError> {
        if max_attempts == 0 {
            return Err(ConfigError::InvalidAttempts);
        }
        Ok(Self { max_attempts, retry_delay })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    // saturates instead of overflowing on absurd delays
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.retry_delay.checked_mul(attempt).unwrap_or(Duration::MAX)
    }

    /// Runs `call` under the shared limiter until it succeeds, fails
    /// definitively, or the attempt budget is spent.
    ///
    /// Every attempt, retries included, takes a slot from `limiter`.
    pub async fn run<T, F, Fut>(&self, limiter: &RateLimiter, mut call: F) -> Result<T, AiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AiError>>,
    {
        let mut attempt = 1;
        loop {
            let queued = Instant::now();
            limiter.acquire().await;
            RATE_LIMIT_WAIT.observe(queued.elapsed().as_secs_f64());
            AI_CALLS_TOTAL.inc();

            let err = match call().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "AI call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if !err.is_transient() {
                AI_FAILURES_TOTAL.inc();
                tracing::warn!(error = %err, "AI call failed, not retrying");
                return Err(err);
            }
            if attempt >= self.max_attempts {
                AI_FAILURES_TOTAL.inc();
                tracing::warn!(attempts = attempt, error = %err, "AI call failed, retries exhausted");
                return Err(err);
            }

            let delay = self.delay_for(attempt);
            AI_RETRIES_TOTAL.inc();
            tracing::warn!(
                attempt,
                max_attempts = self.max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "AI call failed, retrying"
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}
