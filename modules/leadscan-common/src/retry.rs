//! Retry with exponential backoff for outbound provider calls.
//!
//! Factored once so every call site shares the same policy shape instead of
//! repeating sleep/retry loops.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

/// Lets each client's error enum tell the retry loop which failures are
/// transient (connect errors, timeouts, 5xx, 429).
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Delay before the retry following `attempt` (0-based): base * 2^attempt,
    /// capped, plus jitter.
    fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        let jitter = Duration::from_millis(rand::rng().random_range(0..500));
        exp.min(self.max_delay) + jitter
    }
}

/// Run `op`, retrying transient failures per `policy`. Non-retryable errors
/// and the final attempt's error surface unchanged.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, op_name: &str, mut op: F) -> Result<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt + 1 < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    op = op_name,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient provider error, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Debug)]
    enum FakeError {
        ServerError(u16),
        BadRequest,
    }

    impl std::fmt::Display for FakeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                FakeError::ServerError(status) => write!(f, "server error {status}"),
                FakeError::BadRequest => write!(f, "bad request"),
            }
        }
    }

    impl Retryable for FakeError {
        fn is_retryable(&self) -> bool {
            matches!(self, FakeError::ServerError(_))
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
        }
    }

    #[tokio::test]
    async fn two_server_errors_then_success_takes_three_attempts() {
        let attempts = AtomicU32::new(0);
        let result = with_retry(&fast_policy(), "test", || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(FakeError::ServerError(503))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_fails_on_first_attempt() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast_policy(), "test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(FakeError::BadRequest) }
        })
        .await;
        assert!(matches!(result, Err(FakeError::BadRequest)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn attempts_are_bounded() {
        let attempts = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&fast_policy(), "test", || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(FakeError::ServerError(500)) }
        })
        .await;
        assert!(matches!(result, Err(FakeError::ServerError(500))));
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }
}
