use std::time::Duration;

use super::classify::{classify, ErrorClass};
use super::error::DriverError;
use super::matcher::{RequestRateMatcher, ThrottleMatcher};
use super::query::RetryableQuery;

/// Base of the exponential fallback when the server gives no hint.
pub const DEFAULT_FIXED_BACKOFF: Duration = Duration::from_millis(1000);

/// Fallback stops doubling after this many steps (~18h at the default base).
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Cap on attempts for one logical operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxRetries {
    Unlimited,
    Limited(u32),
}

impl MaxRetries {
    /// Config/wire form: any negative value (conventionally `-1`) is unlimited.
    pub fn from_raw(raw: i64) -> Self {
        if raw < 0 {
            MaxRetries::Unlimited
        } else {
            MaxRetries::Limited(u32::try_from(raw).unwrap_or(u32::MAX))
        }
    }

    pub fn as_raw(&self) -> i64 {
        match self {
            MaxRetries::Unlimited => -1,
            MaxRetries::Limited(n) => i64::from(*n),
        }
    }
}

/// What the transport should do with a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryType {
    Retry,
    Rethrow,
}

/// Outcome of evaluating one failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry; wait `after` first if set, otherwise retry immediately.
    Retry { after: Option<Duration> },
    /// Propagate the error unchanged.
    Rethrow,
}

impl RetryDecision {
    pub fn retry_type(&self) -> RetryType {
        match self {
            RetryDecision::Retry { .. } => RetryType::Retry,
            RetryDecision::Rethrow => RetryType::Rethrow,
        }
    }

    /// Time to sleep before retrying (zero for immediate retries and rethrows).
    pub fn delay(&self) -> Duration {
        match self {
            RetryDecision::Retry { after } => after.unwrap_or(Duration::ZERO),
            RetryDecision::Rethrow => Duration::ZERO,
        }
    }
}

/// Failures observed so far in one retry sequence.
///
/// Owned by exactly one logical operation; never shared between operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    attempts: u32,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State after `attempts` evaluated failures.
    pub fn with_attempts(attempts: u32) -> Self {
        Self { attempts }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Count one more failure.
    #[must_use]
    pub fn record_failure(self) -> Self {
        Self {
            attempts: self.attempts.saturating_add(1),
        }
    }

    /// Back to zero; required when a pooled state is handed to a new operation.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

/// Throttling-aware retry policy.
///
/// Immutable once built; per-operation progress lives in [`RetryState`].
#[derive(Debug, Clone)]
pub struct RetryPolicy<M = RequestRateMatcher> {
    max_retries: MaxRetries,
    fixed_backoff: Duration,
    matcher: M,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(-1)
    }
}

impl RetryPolicy {
    /// `max_retries < 0` means unlimited; otherwise an absolute cap on attempts.
    pub fn new(max_retries: i64) -> Self {
        Self {
            max_retries: MaxRetries::from_raw(max_retries),
            fixed_backoff: DEFAULT_FIXED_BACKOFF,
            matcher: RequestRateMatcher::default(),
        }
    }
}

impl<M: ThrottleMatcher> RetryPolicy<M> {
    pub fn with_fixed_backoff(mut self, fixed_backoff: Duration) -> Self {
        self.fixed_backoff = fixed_backoff;
        self
    }

    pub fn with_max_retries(mut self, max_retries: MaxRetries) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Swap the message parser, keeping admission and backoff settings.
    pub fn with_matcher<N: ThrottleMatcher>(self, matcher: N) -> RetryPolicy<N> {
        RetryPolicy {
            max_retries: self.max_retries,
            fixed_backoff: self.fixed_backoff,
            matcher,
        }
    }

    pub fn max_retries(&self) -> MaxRetries {
        self.max_retries
    }

    pub fn fixed_backoff(&self) -> Duration {
        self.fixed_backoff
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    /// Admission gate on a bare attempt count.
    pub fn admits(&self, attempts: u32) -> bool {
        match self.max_retries {
            MaxRetries::Unlimited => true,
            MaxRetries::Limited(max) => attempts < max,
        }
    }

    /// Admission gate consulted by the transport before it re-issues `query`.
    pub fn attempt<Q: RetryableQuery + ?Sized>(&self, query: &Q) -> bool {
        self.admits(query.attempts())
    }

    pub fn classify(&self, err: &DriverError) -> ErrorClass {
        classify(err, &self.matcher)
    }

    /// Retry/rethrow for `err` without touching any attempt count.
    pub fn retry_type(&self, err: &DriverError) -> RetryType {
        if self.classify(err).is_retryable() {
            RetryType::Retry
        } else {
            RetryType::Rethrow
        }
    }

    /// How long to wait after a failure with text `message`.
    ///
    /// `None` when the message is not a throttling response. Otherwise the
    /// server's hint if it sent one, else exponential backoff over
    /// `state.attempts()`, which must already count this failure.
    pub fn retry_after(&self, state: RetryState, message: &str) -> Option<Duration> {
        if !self.matcher.is_throttled(message) {
            return None;
        }
        Some(
            self.matcher
                .retry_after_hint(message)
                .unwrap_or_else(|| self.fallback_backoff(state.attempts())),
        )
    }

    /// `fixed_backoff * 2^(attempts - 1)`: the first failure waits the fixed
    /// backoff, each further one doubles it.
    pub fn fallback_backoff(&self, attempts: u32) -> Duration {
        let exp = attempts.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
        self.fixed_backoff.saturating_mul(1u32 << exp)
    }

    /// One failure, one step: count it, classify it, and pick the wait.
    ///
    /// Admission is not checked here; call [`admits`](Self::admits) with the
    /// returned state's attempt count before re-issuing.
    pub fn evaluate(&self, state: RetryState, err: &DriverError) -> (RetryDecision, RetryState) {
        let state = state.record_failure();
        let decision = match self.classify(err) {
            ErrorClass::Transient => RetryDecision::Retry { after: None },
            ErrorClass::RateLimited { retry_after } => RetryDecision::Retry {
                after: Some(
                    retry_after.unwrap_or_else(|| self.fallback_backoff(state.attempts())),
                ),
            },
            ErrorClass::Fatal => RetryDecision::Rethrow,
        };
        tracing::debug!(
            attempts = state.attempts(),
            ?decision,
            error = %err,
            "evaluated failure"
        );
        (decision, state)
    }
}
