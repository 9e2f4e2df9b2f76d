//! Exponential backoff retry logic for transient failures.
//!
//! This module provides retry functionality with exponential backoff for
//! handling transient network errors when reading remote plan or
//! subscription data. Write operations are never routed through here:
//! retrying a subscription write can double-charge, so writes fail once
//! and surface the error.

use std::time::Duration;

use crate::error::{GateError, Result};

/// Configuration for retry behavior.
///
/// Defines the parameters for exponential backoff retry logic.
/// The delay between retries increases exponentially up to a maximum value.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use activity_gate::reliability::RetryPolicy;
///
/// // Default policy: 3 attempts, 100ms initial delay, 5s max delay
/// let policy = RetryPolicy::default();
///
/// // Custom policy: more aggressive retries
/// let aggressive = RetryPolicy {
///     max_attempts: 5,
///     initial_delay: Duration::from_millis(50),
///     max_delay: Duration::from_secs(10),
///     backoff_multiplier: 2.0,
/// };
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (default: 3)
    pub max_attempts: u32,
    /// Initial delay between retries (default: 100ms)
    pub initial_delay: Duration,
    /// Maximum delay between retries (default: 5s)
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (default: 2.0)
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with default values.
    ///
    /// # Examples
    ///
    /// ```
    /// use activity_gate::reliability::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new();
    /// assert_eq!(policy.max_attempts, 3);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a policy with custom maximum attempts.
    ///
    /// # Examples
    ///
    /// ```
    /// use activity_gate::reliability::RetryPolicy;
    ///
    /// let policy = RetryPolicy::with_max_attempts(5);
    /// assert_eq!(policy.max_attempts, 5);
    /// ```
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self { max_attempts, ..Self::default() }
    }

    /// Calculates delay for a specific attempt.
    ///
    /// Uses exponential backoff: delay = `initial_delay` * (multiplier ^ attempt)
    /// Capped at `max_delay` to prevent excessive waits.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        #[allow(
            clippy::cast_precision_loss,
            reason = "acceptable for duration calculations"
        )]
        let delay_ms = self.initial_delay.as_millis() as f64
            * self
                .backoff_multiplier
                .powi(attempt.try_into().expect("attempt count should fit in i32"));
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "delay_ms is guaranteed to be positive and within reasonable bounds"
        )]
        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }
}

/// Executes operation with exponential backoff retry.
///
/// Retries the operation up to `max_attempts` times, with exponentially
/// increasing delays between attempts. Non-retryable errors (see
/// [`is_retryable`]) are returned immediately without further attempts.
///
/// # Examples
///
/// ```
/// use std::sync::{
///     Arc,
///     atomic::{AtomicU32, Ordering},
/// };
///
/// use activity_gate::{
///     GateError,
///     reliability::{RetryPolicy, retry_with_backoff},
/// };
///
/// # async fn example() -> activity_gate::Result<String> {
/// let policy = RetryPolicy::default();
/// let attempt = Arc::new(AtomicU32::new(0));
///
/// let result = retry_with_backoff(&policy, || {
///     let attempt = Arc::clone(&attempt);
///     async move {
///         let n = attempt.fetch_add(1, Ordering::Relaxed);
///         if n < 2 {
///             Err(GateError::CatalogUnavailable("temporary failure".to_owned()))
///         } else {
///             Ok("success".to_owned())
///         }
///     }
/// })
/// .await?;
///
/// assert_eq!(result, "success");
/// # Ok(result)
/// # }
/// ```
///
/// # Errors
///
/// Returns the last error encountered if all retry attempts fail,
/// or immediately returns non-retryable errors.
///
/// # Panics
///
/// Panics if `max_attempts` is 0 (which would be a configuration error).
/// Always configure `RetryPolicy` with at least 1 attempt.
#[allow(clippy::missing_panics_doc, reason = "panic documented above")]
pub async fn retry_with_backoff<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..policy.max_attempts {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempt = attempt + 1, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => {
                if !is_retryable(&error) {
                    tracing::debug!(error = %error, "Operation failed with non-retryable error");
                    return Err(error);
                }

                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts = policy.max_attempts,
                    error = %error,
                    "Operation failed, retrying"
                );

                last_error = Some(error);

                // Don't sleep after the last attempt
                if attempt + 1 < policy.max_attempts {
                    let delay = policy.delay_for_attempt(attempt);
                    tracing::debug!(delay_ms = delay.as_millis(), "Sleeping before retry");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    // All attempts exhausted, return last error
    Err(last_error.expect("at least one attempt should have been made"))
}

/// Determines if an error is retryable.
///
/// Returns `true` for transient backend failures that might succeed on
/// retry: an unreachable plan catalog or a failing subscription store
/// request.
///
/// Returns `false` for errors that indicate permanent failures or
/// caller-side issues that won't be resolved by retrying, such as
/// validation errors, missing sign-in, or duplicate subscriptions.
///
/// # Examples
///
/// ```
/// use activity_gate::{GateError, reliability::is_retryable};
///
/// // Transient backend failures are retryable
/// let error = GateError::CatalogUnavailable("connection reset".to_owned());
/// assert!(is_retryable(&error));
///
/// // Validation errors are not
/// let error = GateError::InvalidPlan("no-such-plan".to_owned());
/// assert!(!is_retryable(&error));
/// ```
#[must_use]
pub fn is_retryable(error: &GateError) -> bool {
    match error {
        // Transient backend failures
        GateError::PersistenceFailure(_) | GateError::CatalogUnavailable(_) => true,
        // Don't retry authentication or validation errors
        GateError::Unauthenticated
        | GateError::InvalidUserId(_)
        | GateError::InvalidPlan(_)
        | GateError::InvalidConfig(_) => false,
        // Don't retry state conflicts; the store answer won't change
        GateError::AlreadySubscribed | GateError::NotSubscribed => false,
        // Don't retry lookups of content that does not exist
        GateError::ActivityNotFound(_) => false,
    }
}

#[cfg(test)]
#[allow(
    clippy::str_to_string,
    clippy::float_cmp,
    reason = "test code uses these patterns for readability"
)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(100));
        assert_eq!(policy.max_delay, Duration::from_secs(5));
        assert!((policy.backoff_multiplier - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_retry_policy_with_max_attempts() {
        let policy = RetryPolicy::with_max_attempts(5);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_delay, Duration::from_millis(100));
    }

    #[test]
    fn test_delay_for_attempt() {
        let policy = RetryPolicy::default();

        // First retry: 100ms * 2^0 = 100ms
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));

        // Second retry: 100ms * 2^1 = 200ms
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));

        // Third retry: 100ms * 2^2 = 400ms
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_capped_at_max() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
        };

        // Large attempt number should be capped at max_delay
        let delay = policy.delay_for_attempt(10);
        assert_eq!(delay, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_retry_success_first_attempt() {
        let policy = RetryPolicy::with_max_attempts(3);
        let call_count = Arc::new(Mutex::new(0));

        let count_clone = Arc::clone(&call_count);
        let result = retry_with_backoff(&policy, || {
            let count = Arc::clone(&count_clone);
            async move {
                let mut c = count.lock().unwrap();
                *c += 1;
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(*call_count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_retry_success_after_transient_failures() {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            backoff_multiplier: 2.0,
        };
        let call_count = Arc::new(Mutex::new(0));

        let count_clone = Arc::clone(&call_count);
        let result = retry_with_backoff(&policy, || {
            let count = Arc::clone(&count_clone);
            async move {
                let mut c = count.lock().unwrap();
                *c += 1;
                let current = *c;
                drop(c);

                if current < 3 {
                    Err(GateError::CatalogUnavailable("temporary failure".to_string()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(*call_count.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_retry_all_attempts_fail() {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            backoff_multiplier: 2.0,
        };
        let call_count = Arc::new(Mutex::new(0));

        let count_clone = Arc::clone(&call_count);
        let result = retry_with_backoff(&policy, || {
            let count = Arc::clone(&count_clone);
            async move {
                let mut c = count.lock().unwrap();
                *c += 1;
                drop(c);
                Err::<i32, GateError>(GateError::PersistenceFailure(
                    "persistent outage".to_string(),
                ))
            }
        })
        .await;

        assert!(matches!(result, Err(GateError::PersistenceFailure(_))));
        assert_eq!(*call_count.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_fails_fast() {
        let policy = RetryPolicy::with_max_attempts(5);
        let call_count = Arc::new(Mutex::new(0));

        let count_clone = Arc::clone(&call_count);
        let result = retry_with_backoff(&policy, || {
            let count = Arc::clone(&count_clone);
            async move {
                let mut c = count.lock().unwrap();
                *c += 1;
                drop(c);
                Err::<i32, GateError>(GateError::InvalidPlan("no-such-plan".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(GateError::InvalidPlan(_))));
        // A validation failure must not be attempted again
        assert_eq!(*call_count.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_retry_timing() {
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
        };

        let start = std::time::Instant::now();
        let _result = retry_with_backoff(&policy, || async {
            Err::<i32, GateError>(GateError::CatalogUnavailable("error".to_string()))
        })
        .await;

        let elapsed = start.elapsed();

        // Should have delays: 10ms + 20ms = 30ms minimum
        // Allow some overhead for test execution
        assert!(elapsed >= Duration::from_millis(30), "Expected at least 30ms, got {elapsed:?}");
    }

    #[test]
    fn test_is_retryable_transient_errors() {
        assert!(is_retryable(&GateError::PersistenceFailure("timeout".to_string())));
        assert!(is_retryable(&GateError::CatalogUnavailable("connection reset".to_string())));
    }

    #[test]
    fn test_is_not_retryable_validation_errors() {
        assert!(!is_retryable(&GateError::Unauthenticated));
        assert!(!is_retryable(&GateError::InvalidUserId("".to_string())));
        assert!(!is_retryable(&GateError::InvalidPlan("bogus".to_string())));
        assert!(!is_retryable(&GateError::InvalidConfig("bad url".to_string())));
    }

    #[test]
    fn test_is_not_retryable_state_conflicts() {
        assert!(!is_retryable(&GateError::AlreadySubscribed));
        assert!(!is_retryable(&GateError::NotSubscribed));
        assert!(!is_retryable(&GateError::ActivityNotFound("act-1".to_string())));
    }

    #[tokio::test]
    async fn test_retry_single_attempt() {
        let policy = RetryPolicy::with_max_attempts(1);
        let call_count = Arc::new(Mutex::new(0));

        let count_clone = Arc::clone(&call_count);
        let result = retry_with_backoff(&policy, || {
            let count = Arc::clone(&count_clone);
            async move {
                let mut c = count.lock().unwrap();
                *c += 1;
                drop(c);
                Err::<i32, GateError>(GateError::PersistenceFailure("error".to_string()))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(*call_count.lock().unwrap(), 1);
    }
}
