//! Backend-specific parsing of throttling error text.
//!
//! The throttling backend reports rate limiting only as prose, e.g.
//!
//! ```text
//! Request rate is large: ActivityID=c268afb6-..., RetryAfterMs=42, Additional details='...'
//! ```
//!
//! Everything that depends on that wording lives behind [`ThrottleMatcher`],
//! so backoff and admission logic can be exercised with any matcher.

use std::time::Duration;

/// Default throttling signature.
pub const DEFAULT_SIGNATURE: &str = "Request rate is large";
/// Default label of the server's retry hint (milliseconds).
pub const DEFAULT_HINT_LABEL: &str = "RetryAfterMs=";

/// Detects throttling responses and extracts the server's wait hint.
pub trait ThrottleMatcher: Send + Sync {
    /// Whether the message is a throttling response at all.
    fn is_throttled(&self, message: &str) -> bool;

    /// Server-suggested wait, if the message carries a parsable one.
    ///
    /// Independent of [`is_throttled`](Self::is_throttled): callers decide
    /// how to combine the two.
    fn retry_after_hint(&self, message: &str) -> Option<Duration>;
}

/// Substring matcher for "Request rate is large" / `RetryAfterMs=<n>` messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRateMatcher {
    signature: String,
    hint_label: String,
}

impl Default for RequestRateMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNATURE, DEFAULT_HINT_LABEL)
    }
}

impl RequestRateMatcher {
    pub fn new(signature: impl Into<String>, hint_label: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            hint_label: hint_label.into(),
        }
    }

    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn hint_label(&self) -> &str {
        &self.hint_label
    }
}

impl ThrottleMatcher for RequestRateMatcher {
    fn is_throttled(&self, message: &str) -> bool {
        !self.signature.is_empty() && message.contains(self.signature.as_str())
    }

    fn retry_after_hint(&self, message: &str) -> Option<Duration> {
        if self.hint_label.is_empty() {
            return None;
        }
        message
            .match_indices(self.hint_label.as_str())
            .filter(|(idx, _)| at_token_start(message, *idx))
            .find_map(|(idx, label)| parse_millis(&message[idx + label.len()..]))
    }
}

/// The label must not be the tail of a longer identifier (`XRetryAfterMs=`).
fn at_token_start(message: &str, idx: usize) -> bool {
    message[..idx]
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric() && c != '_')
}

/// Leading ASCII digits as milliseconds; `None` if there are none or they overflow.
fn parse_millis(rest: &str) -> Option<Duration> {
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse::<u64>().ok().map(Duration::from_millis)
}
