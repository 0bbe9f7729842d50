//! Retry logic with exponential backoff
//!
//! Data API calls go through [`RetryPolicy::execute`]. Only transient
//! failures (timeouts, connection errors, HTTP 5xx and 429) are retried.

use crate::error::{ReportError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, first call included
    pub max_attempts: u32,

    /// Delay before the second attempt
    pub initial_backoff: Duration,

    /// Upper bound for any single delay
    pub max_backoff: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            max_backoff,
            backoff_multiplier,
        }
    }

    /// A single attempt, no waiting
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Millisecond delays, for tests against mock servers
    pub fn fast() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(5),
            max_backoff: Duration::from_millis(50),
            backoff_multiplier: 2.0,
        }
    }

    /// Delay to wait before `attempt` (1-based count of retries so far)
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let millis = self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let backoff = Duration::from_millis(millis.min(u64::MAX as f64) as u64);

        backoff.min(self.max_backoff)
    }

    /// Run `operation` until it succeeds, fails permanently or attempts run out
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 0..attempts {
            debug!("Attempt {}/{} for {}", attempt + 1, attempts, operation_name);

            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!("{} succeeded after {} retries", operation_name, attempt);
                    }
                    return Ok(value);
                }
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    if attempt + 1 < attempts {
                        let backoff = self.backoff_duration(attempt + 1);
                        warn!(
                            "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                            operation_name,
                            attempt + 1,
                            attempts,
                            e,
                            backoff
                        );
                        sleep(backoff).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        let error = last_error
            .unwrap_or_else(|| ReportError::Other(format!("{operation_name}: retry loop ended without a result")));
        warn!("{} failed after {} attempts: {}", operation_name, attempts, error);
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    fn rate_limited() -> ReportError {
        ReportError::RateLimitExceeded {
            provider: "FRED".to_string(),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_backoff, Duration::from_millis(500));
        assert_eq!(policy.max_backoff, Duration::from_secs(10));
    }

    #[test]
    fn test_backoff_calculation() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_duration(0), Duration::ZERO);
        assert_eq!(policy.backoff_duration(1), Duration::from_millis(500));
        assert_eq!(policy.backoff_duration(2), Duration::from_secs(1));
        assert_eq!(policy.backoff_duration(3), Duration::from_secs(2));
        assert_eq!(policy.backoff_duration(12), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_retries_transient_errors() {
        let policy = RetryPolicy::fast();
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();

        let result = policy
            .execute("fetch", || {
                let counter = counter.clone();
                async move {
                    let mut n = counter.lock().await;
                    *n += 1;
                    if *n < 3 { Err(rate_limited()) } else { Ok(7) }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(*calls.lock().await, 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let policy = RetryPolicy::fast();
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();

        let result: Result<()> = policy
            .execute("fetch", || {
                let counter = counter.clone();
                async move {
                    *counter.lock().await += 1;
                    Err(rate_limited())
                }
            })
            .await;

        assert!(matches!(result, Err(ReportError::RateLimitExceeded { .. })));
        assert_eq!(*calls.lock().await, 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let policy = RetryPolicy::fast();
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();

        let result: Result<()> = policy
            .execute("fetch", || {
                let counter = counter.clone();
                async move {
                    *counter.lock().await += 1;
                    Err(ReportError::unavailable("DCOILWTICO", "no rows"))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(*calls.lock().await, 1);
    }
}
