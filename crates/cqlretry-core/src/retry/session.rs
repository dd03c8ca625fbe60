//! Stateful retry hook for transports that call back once per failure.

use std::time::Duration;

use super::error::DriverError;
use super::matcher::ThrottleMatcher;
use super::policy::{RetryDecision, RetryPolicy, RetryState, RetryType};
use super::query::RetryableQuery;

/// The callbacks a driver invokes around a failed request, in this order:
/// admission, classification, wait.
pub trait RetryHook {
    fn attempt(&self, query: &dyn RetryableQuery) -> bool;
    fn get_retry_type(&mut self, err: &DriverError) -> RetryType;
    fn retry_after(&self, message: &str) -> Option<Duration>;
}

/// One logical operation's view of a [`RetryPolicy`].
///
/// `get_retry_type` counts the failure it is given, and `retry_after` reads
/// that count, so they must be called once each per physical failure.
/// Calling `get_retry_type` twice for one failure counts it twice.
#[derive(Debug)]
pub struct RetrySession<'a, M> {
    policy: &'a RetryPolicy<M>,
    state: RetryState,
}

impl<'a, M: ThrottleMatcher> RetrySession<'a, M> {
    pub fn new(policy: &'a RetryPolicy<M>) -> Self {
        Self {
            policy,
            state: RetryState::new(),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.state.attempts()
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    /// Reuse this session for a new operation.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Count, classify and pick the wait in one call.
    pub fn evaluate(&mut self, err: &DriverError) -> RetryDecision {
        let (decision, state) = self.policy.evaluate(self.state, err);
        self.state = state;
        decision
    }
}

impl<M: ThrottleMatcher> RetryHook for RetrySession<'_, M> {
    fn attempt(&self, query: &dyn RetryableQuery) -> bool {
        self.policy.attempt(query)
    }

    fn get_retry_type(&mut self, err: &DriverError) -> RetryType {
        self.state = self.state.record_failure();
        self.policy.retry_type(err)
    }

    fn retry_after(&self, message: &str) -> Option<Duration> {
        self.policy.retry_after(self.state, message)
    }
}
