//! Reusable retry policy with exponential backoff.
//!
//! Only transient provider errors are retried; everything else returns
//! immediately. Backoff doubles per attempt and is capped, and sleeping
//! happens inside the calling task without holding anything shared.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::errors::{AgentError, AgentResult};
use crate::domain::models::config::RetryConfig;

/// Retry policy for calls into the embedding/chat provider.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    max_attempts: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// budget is spent.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> AgentResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AgentResult<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(attempt = attempt + 1, "operation succeeded after retrying");
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if !self.should_retry(&err, attempt) {
                        if attempt + 1 >= self.max_attempts && err.is_transient() {
                            warn!(attempts = attempt + 1, error = %err, "retry budget exhausted");
                        } else {
                            debug!(error = %err, "permanent error, not retrying");
                        }
                        return Err(err);
                    }

                    let backoff = self.calculate_backoff(attempt);
                    warn!(
                        attempt = attempt + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "transient error, backing off before retry"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Backoff for a 0-indexed attempt: `initial * 2^attempt`, capped.
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);
        Duration::from_millis(backoff_ms)
    }

    fn should_retry(&self, error: &AgentError, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts && error.is_transient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(5, 1000, 30_000);

        assert_eq!(policy.calculate_backoff(0), Duration::from_millis(1000));
        assert_eq!(policy.calculate_backoff(1), Duration::from_millis(2000));
        assert_eq!(policy.calculate_backoff(2), Duration::from_millis(4000));
        assert_eq!(policy.calculate_backoff(4), Duration::from_millis(16_000));
        assert_eq!(policy.calculate_backoff(5), Duration::from_millis(30_000));
        assert_eq!(policy.calculate_backoff(12), Duration::from_millis(30_000));
    }

    #[test]
    fn backoff_survives_huge_attempt_numbers() {
        let policy = RetryPolicy::new(3, 1000, 30_000);
        assert_eq!(policy.calculate_backoff(u32::MAX), Duration::from_millis(30_000));
    }

    #[tokio::test]
    async fn succeeds_without_retrying() {
        let policy = RetryPolicy::new(3, 10, 100);
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy
            .execute(|| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_until_success() {
        let policy = RetryPolicy::new(3, 10, 100);
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy
            .execute(|| {
                let calls = Arc::clone(&calls);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(AgentError::provider_transient("rate limited"))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let policy = RetryPolicy::new(3, 10, 100);
        let calls = Arc::new(AtomicU32::new(0));

        let result: AgentResult<()> = policy
            .execute(|| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(AgentError::provider_permanent("bad request"))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stops_at_the_attempt_budget() {
        let policy = RetryPolicy::new(3, 10, 100);
        let calls = Arc::new(AtomicU32::new(0));

        let result: AgentResult<()> = policy
            .execute(|| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(AgentError::provider_transient("still overloaded"))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
