//! Driver error value fed to the policy, and the error surfaced by the retry loop.

use thiserror::Error;

/// Error returned by a single query execution.
///
/// The three structured variants are the driver's own retryable faults. The
/// throttling backend does not send structured metadata, so rate limiting
/// only ever shows up as free text in `Server` or `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Coordinator timed out waiting for replica reads.
    #[error("read timeout: {message}")]
    ReadTimeout { message: String },
    /// Coordinator timed out waiting for replica writes.
    #[error("write timeout: {message}")]
    WriteTimeout { message: String },
    /// Not enough replicas alive to satisfy the consistency level.
    #[error("unavailable: {message}")]
    Unavailable { message: String },
    /// Error frame returned by the server.
    #[error("{message}")]
    Server { message: String },
    /// Anything else the driver could not execute.
    #[error("{message}")]
    Other { message: String },
}

impl DriverError {
    pub fn server(message: impl Into<String>) -> Self {
        DriverError::Server {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        DriverError::Other {
            message: message.into(),
        }
    }

    /// Raw text the throttle matcher inspects.
    pub fn message(&self) -> &str {
        match self {
            DriverError::ReadTimeout { message }
            | DriverError::WriteTimeout { message }
            | DriverError::Unavailable { message }
            | DriverError::Server { message }
            | DriverError::Other { message } => message,
        }
    }

    /// Read timeout, write timeout, or unavailable.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DriverError::ReadTimeout { .. }
                | DriverError::WriteTimeout { .. }
                | DriverError::Unavailable { .. }
        )
    }
}

/// Why [`run_with_retry`](super::run_with_retry) gave up.
#[derive(Debug, Error)]
pub enum RetryError {
    /// The policy classified the error as not retryable; propagated unchanged.
    #[error(transparent)]
    Rethrown(DriverError),
    /// The retry budget ran out; carries the last error seen.
    #[error("retry budget exhausted after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: DriverError,
    },
}

impl RetryError {
    /// The driver error that ended the retry sequence.
    pub fn driver_error(&self) -> &DriverError {
        match self {
            RetryError::Rethrown(e) => e,
            RetryError::Exhausted { source, .. } => source,
        }
    }
}
