//! Retry and backoff policy for throttling CQL backends.
//!
//! This module encapsulates error classification (driver timeouts,
//! unavailable replicas, request-rate throttling reported as text) and the
//! wait-time decision, so the transport only has to ask "again, and when?".

mod classify;
mod error;
mod matcher;
mod policy;
mod query;
mod run;
mod session;

pub use classify::{classify, classify_message, ErrorClass};
pub use error::{DriverError, RetryError};
pub use matcher::{RequestRateMatcher, ThrottleMatcher, DEFAULT_HINT_LABEL, DEFAULT_SIGNATURE};
pub use policy::{
    MaxRetries, RetryDecision, RetryPolicy, RetryState, RetryType, DEFAULT_FIXED_BACKOFF,
};
pub use query::{Consistency, RetryableQuery};
pub use run::run_with_retry;
pub use session::{RetryHook, RetrySession};
