/// Fixed-delay retry utility for absorbing transient upstream unavailability
use crate::constants::{
    RECONCILE_MAX_ATTEMPTS, RECONCILE_RETRY_DELAY_MS, RESOLVER_MAX_ATTEMPTS,
    RESOLVER_RETRY_DELAY_MS,
};
use crate::error::AttribflowError;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy: a bounded attempt count with a fixed delay between
/// attempts, decoupled from business logic so tests can use millisecond
/// delays instead of sleeping in real time.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay_ms: u64) -> Self {
        Self {
            max_attempts,
            delay: Duration::from_millis(delay_ms),
        }
    }

    /// Storefront read/write attempts during reconciliation (6 x 1.5s)
    pub fn reconcile_default() -> Self {
        Self::new(RECONCILE_MAX_ATTEMPTS, RECONCILE_RETRY_DELAY_MS)
    }

    /// Webhook-side attribution resolution attempts (3 x 2s)
    pub fn resolver_default() -> Self {
        Self::new(RESOLVER_MAX_ATTEMPTS, RESOLVER_RETRY_DELAY_MS)
    }
}

/// Retries an async operation under a fixed-delay policy.
///
/// Non-retriable errors abort immediately; retriable ones are re-attempted
/// until the attempt cap, then the last error is returned.
pub async fn retry_with_policy<F, Fut, T>(
    mut operation: F,
    policy: RetryPolicy,
    operation_name: &str,
) -> Result<T, AttribflowError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AttribflowError>>,
{
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if !e.is_retriable() {
                    warn!(
                        operation = operation_name,
                        error = %e,
                        "Permanent error, not retrying"
                    );
                    return Err(e);
                }

                if attempt >= policy.max_attempts {
                    warn!(
                        operation = operation_name,
                        attempt = attempt,
                        max_attempts = policy.max_attempts,
                        error = %e,
                        "Attempts exhausted"
                    );
                    return Err(e);
                }

                warn!(
                    operation = operation_name,
                    attempt = attempt,
                    delay_ms = policy.delay.as_millis(),
                    error = %e,
                    "Retriable error, will retry after delay"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_success_first_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result = retry_with_policy(
            || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok::<i32, AttribflowError>(42)
                }
            },
            RetryPolicy::new(3, 10),
            "test_op",
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_after_transient_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result = retry_with_policy(
            || {
                let c = c.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(AttribflowError::Upstream("503".to_string()))
                    } else {
                        Ok::<i32, AttribflowError>(42)
                    }
                }
            },
            RetryPolicy::new(5, 10),
            "test_op",
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_no_retry() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result: Result<i32, _> = retry_with_policy(
            || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(AttribflowError::UserErrors("bad title".to_string()))
                }
            },
            RetryPolicy::new(5, 10),
            "test_op",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_attempts_exhausted() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result: Result<i32, _> = retry_with_policy(
            || {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(AttribflowError::Upstream("timeout".to_string()))
                }
            },
            RetryPolicy::new(3, 10),
            "test_op",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
