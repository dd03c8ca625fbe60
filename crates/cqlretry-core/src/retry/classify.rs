//! Classify driver errors into retry policy error classes.

use std::time::Duration;

use super::error::DriverError;
use super::matcher::ThrottleMatcher;

/// High-level classification of a failure for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Server asked us to back off, optionally saying for how long.
    RateLimited { retry_after: Option<Duration> },
    /// Read timeout, write timeout or unavailable replicas.
    Transient,
    /// Anything else; never retried.
    Fatal,
}

impl ErrorClass {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ErrorClass::Fatal)
    }
}

/// Classify a driver error.
///
/// Structured transient faults win over message text; the matcher is only
/// consulted for the free-text variants' messages.
pub fn classify<M: ThrottleMatcher + ?Sized>(err: &DriverError, matcher: &M) -> ErrorClass {
    if err.is_transient() {
        return ErrorClass::Transient;
    }
    classify_message(err.message(), matcher)
}

/// Classify bare error text (no structured driver fault available).
pub fn classify_message<M: ThrottleMatcher + ?Sized>(message: &str, matcher: &M) -> ErrorClass {
    if matcher.is_throttled(message) {
        ErrorClass::RateLimited {
            retry_after: matcher.retry_after_hint(message),
        }
    } else {
        ErrorClass::Fatal
    }
}
