//! Failure taxonomy for dispatches to the remote agent.
//!
//! Every failed dispatch carries exactly one [`ErrorKind`]. The set is closed:
//!
//! | Code  | Kind                 | Raised by                          |
//! |-------|----------------------|------------------------------------|
//! | W1001 | `timeout`            | deadline cancellation              |
//! | W1002 | `network_unreachable`| connect / DNS / send failures      |
//! | W2001 | `remote_error`       | non-2xx HTTP status                |
//! | W3001 | `empty_body`         | 2xx with empty or blank body       |
//! | W3002 | `malformed_payload`  | 2xx body that is not UTF-8 text    |
//! | W3003 | `unrecognized_shape` | reply with no extractable content  |
//! | W9999 | `unknown`            | anything unclassified              |
//!
//! ## Example
//!
//! ```rust
//! use agent_webhook::error_kind::ErrorKind;
//!
//! let kind = ErrorKind::RemoteError(503);
//! assert_eq!(kind.code(), "W2001");
//! assert!(kind.retryable());
//! assert_eq!(kind.status(), Some(503));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a failed dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum ErrorKind {
    /// W1001: the deadline elapsed before a full response arrived
    Timeout,
    /// W1002: the endpoint could not be reached at the transport level
    NetworkUnreachable,
    /// W2001: the endpoint answered with a non-2xx HTTP status
    RemoteError(u16),
    /// W3001: the endpoint answered 2xx with no body
    EmptyBody,
    /// W3002: the body could not be decoded as text
    MalformedPayload,
    /// W3003: the body decoded, but no usable reply could be extracted
    UnrecognizedShape,
    /// W9999: error could not be classified
    Unknown,
}

impl ErrorKind {
    /// Returns the canonical code string (e.g., `"W1001"`).
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout => "W1001",
            Self::NetworkUnreachable => "W1002",
            Self::RemoteError(_) => "W2001",
            Self::EmptyBody => "W3001",
            Self::MalformedPayload => "W3002",
            Self::UnrecognizedShape => "W3003",
            Self::Unknown => "W9999",
        }
    }

    /// Returns the snake_case name (e.g., `"network_unreachable"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::NetworkUnreachable => "network_unreachable",
            Self::RemoteError(_) => "remote_error",
            Self::EmptyBody => "empty_body",
            Self::MalformedPayload => "malformed_payload",
            Self::UnrecognizedShape => "unrecognized_shape",
            Self::Unknown => "unknown",
        }
    }

    /// HTTP status carried by [`ErrorKind::RemoteError`].
    #[inline]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteError(status) => Some(*status),
            _ => None,
        }
    }

    /// Whether re-sending the same message has a reasonable chance of succeeding.
    ///
    /// This is a hint for the presentation layer only; the dispatcher never retries.
    pub fn retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::NetworkUnreachable => true,
            Self::RemoteError(status) => matches!(status, 408 | 429 | 500..=599),
            Self::EmptyBody
            | Self::MalformedPayload
            | Self::UnrecognizedShape
            | Self::Unknown => false,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteError(status) => write!(f, "{} (HTTP {})", self.name(), status),
            _ => f.write_str(self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_retry_hint_follows_status() {
        assert!(ErrorKind::RemoteError(500).retryable());
        assert!(ErrorKind::RemoteError(429).retryable());
        assert!(!ErrorKind::RemoteError(404).retryable());
        assert!(!ErrorKind::UnrecognizedShape.retryable());
    }

    #[test]
    fn display_includes_status() {
        assert_eq!(ErrorKind::RemoteError(502).to_string(), "remote_error (HTTP 502)");
        assert_eq!(ErrorKind::Timeout.to_string(), "timeout");
    }

    #[test]
    fn serializes_with_status_payload() {
        let json = serde_json::to_value(ErrorKind::RemoteError(500)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "remote_error", "status": 500}));
        let json = serde_json::to_value(ErrorKind::EmptyBody).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "empty_body"}));
    }
}
