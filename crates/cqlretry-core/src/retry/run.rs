//! Retry loop: run an async operation until success or the policy says stop.

use std::future::Future;

use super::error::{DriverError, RetryError};
use super::matcher::ThrottleMatcher;
use super::policy::{RetryDecision, RetryPolicy, RetryState};

/// Runs `op` until it succeeds, the error is not retryable, or the policy's
/// attempt cap is reached. `op` receives the number of attempts already made.
///
/// Waits with `tokio::time::sleep`, and yields to the scheduler on immediate
/// retries, so dropping the returned future (timeout, `select!`, task abort)
/// cancels the loop between attempts.
pub async fn run_with_retry<M, F, Fut, T>(
    policy: &RetryPolicy<M>,
    mut op: F,
) -> Result<T, RetryError>
where
    M: ThrottleMatcher,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, DriverError>>,
{
    let mut state = RetryState::new();
    loop {
        let err = match op(state.attempts()).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let (decision, next) = policy.evaluate(state, &err);
        state = next;

        match decision {
            RetryDecision::Rethrow => return Err(RetryError::Rethrown(err)),
            RetryDecision::Retry { .. } if !policy.admits(state.attempts()) => {
                tracing::warn!(
                    attempts = state.attempts(),
                    error = %err,
                    "retry budget exhausted"
                );
                return Err(RetryError::Exhausted {
                    attempts: state.attempts(),
                    source: err,
                });
            }
            RetryDecision::Retry { .. } => {
                let delay = decision.delay();
                tracing::debug!(attempts = state.attempts(), ?delay, "retrying");
                if delay.is_zero() {
                    tokio::task::yield_now().await;
                } else {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;
    use crate::retry::policy::MaxRetries;

    const THROTTLED: &str = "Request rate is large: RetryAfterMs=250, Substatus: 3200";
    const THROTTLED_NO_HINT: &str = "Request rate is large: Substatus: 3200";

    fn timeout() -> DriverError {
        DriverError::ReadTimeout {
            message: "Operation timed out".into(),
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let policy = RetryPolicy::new(5);
        let calls = Cell::new(0u32);
        let out = run_with_retry(&policy, |attempts| {
            calls.set(calls.get() + 1);
            async move {
                if attempts < 2 {
                    Err(timeout())
                } else {
                    Ok(attempts)
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(out, 2);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn fatal_error_is_rethrown_unchanged() {
        let policy = RetryPolicy::new(5);
        let calls = Cell::new(0u32);
        let err = run_with_retry(&policy, |_| {
            calls.set(calls.get() + 1);
            async { Err::<(), _>(DriverError::other("syntax error at line 1")) }
        })
        .await
        .unwrap_err();
        assert_eq!(calls.get(), 1);
        match err {
            RetryError::Rethrown(e) => {
                assert_eq!(e, DriverError::other("syntax error at line 1"))
            }
            other => panic!("expected Rethrown, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stops_at_attempt_cap() {
        let policy = RetryPolicy::new(3);
        let calls = Cell::new(0u32);
        let err = run_with_retry(&policy, |_| {
            calls.set(calls.get() + 1);
            async { Err::<(), _>(timeout()) }
        })
        .await
        .unwrap_err();
        assert_eq!(calls.get(), 3);
        match err {
            RetryError::Exhausted { attempts, source } => {
                assert_eq!(attempts, 3);
                assert_eq!(source, timeout());
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_server_hint() {
        let policy = RetryPolicy::new(5);
        let start = tokio::time::Instant::now();
        run_with_retry(&policy, |attempts| async move {
            if attempts == 0 {
                Err(DriverError::server(THROTTLED))
            } else {
                Ok(())
            }
        })
        .await
        .unwrap();
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(250) && waited < Duration::from_millis(260));
    }

    #[tokio::test(start_paused = true)]
    async fn fallback_wait_doubles() {
        let policy = RetryPolicy::new(-1).with_fixed_backoff(Duration::from_millis(100));
        let start = tokio::time::Instant::now();
        run_with_retry(&policy, |attempts| async move {
            if attempts < 3 {
                Err(DriverError::server(THROTTLED_NO_HINT))
            } else {
                Ok(())
            }
        })
        .await
        .unwrap();
        // 100 + 200 + 400
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(700) && waited < Duration::from_millis(720));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_by_timeout() {
        let policy = RetryPolicy::new(-1).with_max_retries(MaxRetries::Unlimited);
        let res = tokio::time::timeout(
            Duration::from_secs(5),
            run_with_retry(&policy, |_| async {
                Err::<(), _>(DriverError::server(THROTTLED_NO_HINT))
            }),
        )
        .await;
        assert!(res.is_err(), "unlimited throttling must only end by cancellation");
    }

    #[tokio::test]
    async fn immediate_retries_stay_cancellable() {
        let policy = RetryPolicy::new(-1);
        let res = tokio::time::timeout(
            Duration::from_millis(50),
            run_with_retry(&policy, |_| async { Err::<(), _>(timeout()) }),
        )
        .await;
        assert!(res.is_err(), "transient retries must yield to the timer");
    }

    #[tokio::test]
    async fn zero_hint_stays_cancellable() {
        let policy = RetryPolicy::new(-1);
        let res = tokio::time::timeout(
            Duration::from_millis(50),
            run_with_retry(&policy, |_| async {
                Err::<(), _>(DriverError::server("Request rate is large: RetryAfterMs=0"))
            }),
        )
        .await;
        assert!(res.is_err(), "zero-wait retries must yield to the timer");
    }
}
