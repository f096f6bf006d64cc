//! Generic bounded-retry helper shared by the provider adapters and the
//! vector store. Callers supply an explicit transient/permanent predicate;
//! classification never inspects error message text.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Bounded exponential backoff: the sleep after failed attempt `n`
/// (0-based) is `base_delay * 2^n`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay slept after the given failed attempt (0-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }
}

/// Failure outcome of [`retry_with_policy`].
#[derive(Debug)]
pub enum RetryError<E> {
    /// The error was classified permanent; no further attempts were made.
    Permanent(E),
    /// Every attempt failed with a transient error.
    Exhausted { attempts: u32, last: E },
}

/// Runs `op` until it succeeds, fails permanently, or the attempt bound is
/// hit. A policy with `max_attempts == 0` still runs one attempt.
pub async fn retry_with_policy<T, E, Fut, Op, Pred>(
    policy: &RetryPolicy,
    is_transient: Pred,
    mut op: Op,
) -> Result<T, RetryError<E>>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    Pred: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut last: Option<E> = None;

    for attempt in 0..attempts {
        if attempt > 0 {
            tokio::time::sleep(policy.delay_after(attempt - 1)).await;
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if is_transient(&e) => {
                warn!(
                    "attempt {}/{} failed transiently, backing off: {e}",
                    attempt + 1,
                    attempts
                );
                last = Some(e);
            }
            Err(e) => return Err(RetryError::Permanent(e)),
        }
    }

    Err(RetryError::Exhausted {
        attempts,
        last: last.expect("at least one attempt always runs"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    enum FakeError {
        RateLimit,
        BadRequest,
    }

    impl std::fmt::Display for FakeError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                FakeError::RateLimit => write!(f, "rate limit"),
                FakeError::BadRequest => write!(f, "bad request"),
            }
        }
    }

    fn is_transient(e: &FakeError) -> bool {
        matches!(e, FakeError::RateLimit)
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_after_attempt_cap() {
        // Six consecutive rate limits against a 5-attempt cap: the helper
        // must give up after 5 tries, not hang.
        let policy = RetryPolicy::new(5, Duration::from_secs(2));
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = retry_with_policy(&policy, is_transient, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(FakeError::RateLimit) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        match result {
            Err(RetryError::Exhausted { attempts: 5, .. }) => {}
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_schedule_is_exponential() {
        // With base 2s and 5 attempts the sleeps are 2+4+8+16 = 30s.
        let policy = RetryPolicy::new(5, Duration::from_secs(2));
        let started = tokio::time::Instant::now();

        let result: Result<(), _> =
            retry_with_policy(&policy, is_transient, || async { Err(FakeError::RateLimit) })
                .await;

        assert!(matches!(result, Err(RetryError::Exhausted { .. })));
        assert_eq!(started.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_fails_immediately() {
        let policy = RetryPolicy::new(5, Duration::from_secs(2));
        let calls = AtomicU32::new(0);
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = retry_with_policy(&policy, is_transient, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(FakeError::BadRequest) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(RetryError::Permanent(_))));
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let policy = RetryPolicy::new(5, Duration::from_secs(2));
        let calls = AtomicU32::new(0);

        let result = retry_with_policy(&policy, is_transient, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(FakeError::RateLimit)
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert!(matches!(result, Ok(2)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = RetryPolicy::new(5, Duration::from_secs(2));
        assert_eq!(policy.delay_after(0), Duration::from_secs(2));
        assert_eq!(policy.delay_after(1), Duration::from_secs(4));
        assert_eq!(policy.delay_after(4), Duration::from_secs(32));
    }
}
