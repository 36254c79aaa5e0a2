use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use super::errors::LlmApiError;

/// Retry policy with exponential backoff for transient errors
///
/// Backoff doubles with each retry and is capped at `max_backoff_ms`.
/// Rate limits, 5xx responses, timeouts and network errors are retried;
/// everything else fails on the first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    max_retries: u32,
    /// Initial backoff duration in milliseconds
    initial_backoff_ms: u64,
    /// Maximum backoff duration in milliseconds
    max_backoff_ms: u64,
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Example
    /// ```
    /// use pdfqa::infrastructure::llm::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new(3, 1_000, 30_000);
    /// assert_eq!(policy.max_retries(), 3);
    /// ```
    pub const fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Execute an operation, retrying transient failures
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, LlmApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, LlmApiError>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "request succeeded after retrying");
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if !self.should_retry(&err, attempt) {
                        if attempt >= self.max_retries && err.is_transient() {
                            warn!(attempts = attempt + 1, error = %err, "giving up after retries");
                        } else {
                            debug!(error = %err, "permanent error, not retrying");
                        }
                        return Err(err);
                    }

                    let backoff = self.calculate_backoff(attempt);
                    warn!(
                        attempt = attempt + 1,
                        backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transient error, retrying"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Formula: min(initial_backoff * 2^attempt, max_backoff)
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }

    const fn should_retry(&self, error: &LlmApiError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_transient()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1_000, 30_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_calculation() {
        let policy = RetryPolicy::new(5, 1000, 30000);

        assert_eq!(policy.calculate_backoff(0), Duration::from_millis(1000));
        assert_eq!(policy.calculate_backoff(1), Duration::from_millis(2000));
        assert_eq!(policy.calculate_backoff(2), Duration::from_millis(4000));
        assert_eq!(policy.calculate_backoff(4), Duration::from_millis(16000));
        assert_eq!(policy.calculate_backoff(5), Duration::from_millis(30000));
        assert_eq!(policy.calculate_backoff(60), Duration::from_millis(30000));
    }

    #[test]
    fn test_should_retry() {
        let policy = RetryPolicy::new(3, 1000, 60000);

        assert!(policy.should_retry(&LlmApiError::RateLimitExceeded, 0));
        assert!(policy.should_retry(&LlmApiError::Timeout, 2));
        assert!(!policy.should_retry(&LlmApiError::Timeout, 3));
        assert!(!policy.should_retry(&LlmApiError::InvalidApiKey, 0));
    }

    #[tokio::test]
    async fn test_execute_recovers_from_transient_errors() {
        let policy = RetryPolicy::new(3, 1, 5);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = policy
            .execute(move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(LlmApiError::ServerError(
                        StatusCode::SERVICE_UNAVAILABLE,
                        "busy".to_string(),
                    ))
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_execute_fails_fast_on_permanent_error() {
        let policy = RetryPolicy::new(3, 1, 5);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), _> = policy
            .execute(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(LlmApiError::InvalidApiKey)
            })
            .await;

        assert!(matches!(result, Err(LlmApiError::InvalidApiKey)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_execute_gives_up_after_max_retries() {
        let policy = RetryPolicy::new(2, 1, 5);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), _> = policy
            .execute(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(LlmApiError::RateLimitExceeded)
            })
            .await;

        assert!(matches!(result, Err(LlmApiError::RateLimitExceeded)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
