//! Retry with exponential backoff.
//!
//! Used in two places: re-allocating a participation number after a
//! uniqueness collision, and re-sending a confirmation after a relay failure.
//! The operation receives the 1-based attempt number so callers can publish
//! progress, and the outcome reports how many attempts were made.
//!
//! # Example
//!
//! ```rust
//! use registry_runtime::retry::{RetryPolicy, retry_with_predicate};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let policy = RetryPolicy::builder()
//!     .max_retries(2)
//!     .initial_delay(Duration::from_millis(1))
//!     .build();
//!
//! let outcome = retry_with_predicate(
//!     &policy,
//!     |attempt| async move { if attempt < 2 { Err("busy") } else { Ok(attempt) } },
//!     |_err: &&str| true,
//! )
//! .await;
//!
//! assert_eq!(outcome.attempts, 2);
//! assert_eq!(outcome.result, Ok(2));
//! # }
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry policy configuration for exponential backoff.
///
/// # Default Values
///
/// - `max_retries`: 3
/// - `initial_delay`: 100ms
/// - `max_delay`: 30 seconds
/// - `multiplier`: 2.0 (delay doubles each retry)
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: usize,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Cap for the exponential delay.
    pub max_delay: Duration,
    /// Growth factor between consecutive delays.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetryPolicy {
    /// Create a new policy builder.
    #[must_use]
    pub const fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }

    /// Policy that makes exactly one attempt.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self::builder().max_retries(0).build()
    }

    /// Delay before retry number `retry` (0-based).
    ///
    /// `initial_delay * multiplier^retry`, capped at `max_delay`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_precision_loss, clippy::cast_sign_loss)]
    pub fn delay_for_retry(&self, retry: usize) -> Duration {
        let exponent = retry.min(i32::MAX as usize) as i32;
        let delay_ms = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);

        if !delay_ms.is_finite() || delay_ms >= self.max_delay.as_millis() as f64 {
            self.max_delay
        } else {
            Duration::from_millis(delay_ms as u64)
        }
    }

    /// Total attempts this policy allows.
    #[must_use]
    pub const fn max_attempts(&self) -> usize {
        self.max_retries.saturating_add(1)
    }
}

/// Builder for [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct RetryPolicyBuilder {
    max_retries: usize,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
}

impl RetryPolicyBuilder {
    /// Set maximum number of retries.
    #[must_use]
    pub const fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set initial delay before first retry.
    #[must_use]
    pub const fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum delay (cap for exponential backoff).
    #[must_use]
    pub const fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set multiplier for exponential backoff.
    #[must_use]
    pub const fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Build the [`RetryPolicy`].
    #[must_use]
    pub const fn build(self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_delay: self.initial_delay,
            max_delay: self.max_delay,
            multiplier: self.multiplier,
        }
    }
}

/// Result of a retried operation together with the number of attempts made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempted<T, E> {
    /// Final result: the first success, or the last error.
    pub result: Result<T, E>,
    /// Attempts made, at least 1.
    pub attempts: usize,
}

impl<T, E> Attempted<T, E> {
    /// Discards the attempt count.
    ///
    /// # Errors
    ///
    /// Returns the last error if no attempt succeeded.
    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Runs `operation` until it succeeds, returns a non-retryable error, or the
/// policy runs out of retries.
///
/// `operation` receives the attempt number, starting at 1. Errors for which
/// `is_retryable` is false are returned immediately.
pub async fn retry_with_predicate<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    mut operation: F,
    is_retryable: P,
) -> Attempted<T, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Operation succeeded after retry");
                }
                return Attempted {
                    result: Ok(value),
                    attempts: attempt,
                };
            }
            Err(err) if !is_retryable(&err) => {
                tracing::warn!(attempt, error = %err, "Error is not retryable, failing immediately");
                return Attempted {
                    result: Err(err),
                    attempts: attempt,
                };
            }
            Err(err) if attempt >= policy.max_attempts() => {
                tracing::error!(attempt, error = %err, "Operation failed after max retries");
                return Attempted {
                    result: Err(err),
                    attempts: attempt,
                };
            }
            Err(err) => {
                let delay = policy.delay_for_retry(attempt - 1);
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis(),
                    error = %err,
                    "Operation failed, retrying..."
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast(max_retries: usize) -> RetryPolicy {
        RetryPolicy::builder()
            .max_retries(max_retries)
            .initial_delay(Duration::from_millis(1))
            .build()
    }

    #[test]
    fn test_delay_doubles_from_initial() {
        let policy = RetryPolicy::builder()
            .initial_delay(Duration::from_millis(100))
            .multiplier(2.0)
            .max_delay(Duration::from_secs(10))
            .build();

        assert_eq!(policy.delay_for_retry(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_retry(3), Duration::from_millis(800));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::builder()
            .initial_delay(Duration::from_millis(1000))
            .multiplier(10.0)
            .max_delay(Duration::from_secs(2))
            .build();

        assert_eq!(policy.delay_for_retry(5), Duration::from_secs(2));
        assert_eq!(policy.delay_for_retry(10_000), Duration::from_secs(2));
    }

    #[test]
    fn test_no_retry_allows_one_attempt() {
        assert_eq!(RetryPolicy::no_retry().max_attempts(), 1);
        assert_eq!(RetryPolicy::default().max_attempts(), 4);
    }

    #[tokio::test]
    async fn test_first_success_makes_one_attempt() {
        let outcome = retry_with_predicate(&fast(3), |_| async { Ok::<_, String>(42) }, |_| true).await;
        assert_eq!(outcome, Attempted { result: Ok(42), attempts: 1 });
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let outcome = retry_with_predicate(
            &fast(3),
            |attempt| async move {
                if attempt < 3 {
                    Err(format!("attempt {attempt} failed"))
                } else {
                    Ok(attempt)
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(outcome.result, Ok(3));
        assert_eq!(outcome.attempts, 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let outcome = retry_with_predicate(
            &fast(2),
            |attempt| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>(format!("failure {attempt}"))
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(outcome.result, Err("failure 3".to_string()));
        assert_eq!(outcome.attempts, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let outcome = retry_with_predicate(
            &fast(5),
            |_| async { Err::<(), _>("permanent".to_string()) },
            |err: &String| err.contains("transient"),
        )
        .await;

        assert_eq!(outcome.attempts, 1);
        assert!(outcome.into_result().is_err());
    }
}
