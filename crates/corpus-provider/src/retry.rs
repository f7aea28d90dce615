//! Explicit retry policy for provider calls.
//!
//! The policy is a plain value (max attempts, backoff bounds) executed
//! against an async operation, so retry behavior is visible in the call
//! site and testable on its own.

use std::future::Future;
use std::time::Duration;

use backoff::{backoff::Backoff, ExponentialBackoff};
use tracing::{debug, error, warn};

use corpus_types::RetrySettings;

use crate::ProviderError;

/// Bounded exponential-backoff retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum attempts, first try included
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on each subsequent retry
    pub initial_delay: Duration,

    /// Upper bound on the delay between retries
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with explicit bounds.
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
        }
    }

    /// Build a policy from loaded settings.
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_delay: settings.initial_delay(),
            max_delay: settings.max_delay(),
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_delay,
            max_interval: self.max_delay,
            multiplier: 2.0,
            randomization_factor: 0.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    /// Run `op`, retrying failed attempts with exponential backoff.
    ///
    /// Non-retryable errors abort immediately; otherwise the operation is
    /// attempted up to `max_attempts` times with a growing delay between
    /// attempts, and the last error is returned on exhaustion.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut backoff = self.backoff();
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, "Calling embedding provider");

            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => {
                    error!(error = %e, "Provider call failed with non-retryable error");
                    return Err(e);
                }
                Err(e) => {
                    if attempts >= self.max_attempts {
                        error!(error = %e, "Max retries exceeded");
                        return Err(e);
                    }

                    match backoff.next_backoff() {
                        Some(delay) => {
                            warn!(
                                error = %e,
                                retry_in_ms = delay.as_millis(),
                                "Provider call failed, retrying"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => {
                            error!(error = %e, "Backoff exhausted");
                            return Err(e);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(
            max_attempts,
            Duration::from_millis(1),
            Duration::from_millis(4),
        )
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicUsize::new(0);
        let result = fast_policy(3)
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ProviderError>(42)
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let calls = AtomicUsize::new(0);
        let result = fast_policy(3)
            .run(|| async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Err(ProviderError::Api("transient".to_string()))
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhausts_attempts() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = fast_policy(3)
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::Api("still down".to_string()))
            })
            .await;

        assert!(matches!(result, Err(ProviderError::Api(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_short_circuits() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), _> = fast_policy(3)
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::Config("missing api key".to_string()))
            })
            .await;

        assert!(matches!(result, Err(ProviderError::Config(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_settings() {
        let settings = RetrySettings::default();
        let policy = RetryPolicy::from_settings(&settings);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_secs(2));
        assert_eq!(policy.max_delay, Duration::from_secs(10));
    }
}
