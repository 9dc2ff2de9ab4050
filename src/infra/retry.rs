use std::future::Future;
use std::time::Duration;

use crate::error::CallFailure;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Fixed-delay retry: at most `max_attempts` tries, `delay` between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempt budget is spent. The attempt number (1-based) is passed in.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, CallFailure>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, CallFailure>>,
    {
        let max_attempts = self.max_attempts;
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(failure) if !failure.is_retryable() || attempt >= max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        kind = failure.kind(),
                        "giving up: {failure}"
                    );
                    return Err(failure);
                }
                Err(failure) => {
                    tracing::debug!(
                        attempt,
                        max_attempts,
                        kind = failure.kind(),
                        "attempt failed, retrying in {:?}: {failure}",
                        self.delay
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use tokio::time::Instant;

    use super::*;

    fn quick(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn stops_after_first_success() {
        let calls = AtomicU32::new(0);
        let result = quick(3)
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, CallFailure>("done") }
            })
            .await;
        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn succeeds_on_a_later_attempt() {
        let calls = AtomicU32::new(0);
        let result = quick(3)
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(CallFailure::Transport("connection reset".to_string()))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn returns_last_failure_when_budget_is_spent() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = quick(4)
            .run(|attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    Err(CallFailure::BadStatus {
                        status: 500,
                        body: format!("attempt {attempt}"),
                    })
                }
            })
            .await;
        assert_eq!(
            result,
            Err(CallFailure::BadStatus {
                status: 500,
                body: "attempt 4".to_string()
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn does_not_retry_configuration_failures() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = quick(3)
            .run(|_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(CallFailure::Configuration("missing key".to_string())) }
            })
            .await;
        assert!(matches!(result, Err(CallFailure::Configuration(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clamps_zero_attempts_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_the_fixed_delay_between_attempts_only() {
        let start = Instant::now();
        let stamps = Mutex::new(Vec::new());

        let result: Result<(), _> = RetryPolicy::new(3, Duration::from_secs(2))
            .run(|_| {
                stamps.lock().unwrap().push(start.elapsed());
                async { Err(CallFailure::Timeout) }
            })
            .await;

        assert_eq!(result, Err(CallFailure::Timeout));
        assert_eq!(
            *stamps.lock().unwrap(),
            vec![
                Duration::ZERO,
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
        assert_eq!(start.elapsed(), Duration::from_secs(4));
    }
}
