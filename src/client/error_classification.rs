//! Error classification: maps raised failures onto [`ErrorKind`] plus a user-facing message.
//!
//! Only consulted for failures whose kind the dispatcher does not already know (deadline
//! cancellation and anything raised by the transport). Structured signals on a
//! `reqwest::Error` are checked first; the message text is matched only as a fallback.

use crate::error_kind::ErrorKind;
use crate::transport::TransportError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

/// Message fragments left behind by a deadline abort. `connection aborted` is not one of
/// them; it is a network failure.
const TIMEOUT_PATTERNS: &[&str] = &[
    "aborted a request",
    "operation was aborted",
    "cancelled",
    "timed out",
];

/// Message fragments that identify a connect / fetch-level failure.
const NETWORK_PATTERNS: &[&str] = &[
    "failed to fetch",
    "error sending request",
    "connection refused",
    "connection reset",
    "connection aborted",
    "connection closed",
    "tcp connect error",
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "network is unreachable",
    "no route to host",
    "cors policy",
    "cors request",
];

/// `Error: 500`, `HTTP 404`, `status 503`, `status code 429`.
static STATUS_IN_MESSAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:error|http|status(?:\s+code)?)\s*:?\s*([2-5]\d{2})\b")
        .expect("status pattern is valid")
});

/// A failure raised while dispatching, before it has a kind.
#[derive(Debug, thiserror::Error)]
pub enum RawError {
    /// The dispatch deadline fired and the in-flight call was dropped.
    #[error("request cancelled at deadline")]
    Cancelled,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Other(String),
}

/// Kind plus the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: ErrorKind,
    pub message: String,
}

impl Classification {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Classifier bound to the deadline of the dispatch it reports on.
#[derive(Debug, Clone, Copy)]
pub struct ErrorClassifier {
    deadline: Duration,
}

impl ErrorClassifier {
    pub fn new(deadline: Duration) -> Self {
        Self { deadline }
    }

    pub fn classify(&self, error: &RawError) -> Classification {
        match error {
            RawError::Cancelled => self.timeout(),
            RawError::Transport(TransportError::Http(e)) => self.classify_reqwest(e),
            RawError::Transport(TransportError::Other(msg)) | RawError::Other(msg) => {
                self.classify_message(msg)
            }
        }
    }

    /// Classify from message text alone.
    pub fn classify_message(&self, raw: &str) -> Classification {
        let lower = raw.to_lowercase();

        if TIMEOUT_PATTERNS.iter().any(|p| lower.contains(p)) {
            return self.timeout();
        }
        if NETWORK_PATTERNS.iter().any(|p| lower.contains(p)) {
            return network_unreachable(raw);
        }
        if let Some(status) = status_in_message(raw) {
            return remote_error(status);
        }
        Classification::new(ErrorKind::Unknown, format!("Unexpected error: {}", raw))
    }

    fn classify_reqwest(&self, e: &reqwest::Error) -> Classification {
        let chain = error_chain(e);
        if e.is_timeout() {
            return self.timeout();
        }
        if let Some(status) = e.status() {
            return remote_error(status.as_u16());
        }
        if e.is_connect() || e.is_request() {
            return network_unreachable(&chain);
        }
        self.classify_message(&chain)
    }

    fn timeout(&self) -> Classification {
        Classification::new(
            ErrorKind::Timeout,
            format!(
                "The request timed out after {} seconds. The remote agent may still be working; please try again.",
                format_secs(self.deadline)
            ),
        )
    }
}

fn network_unreachable(underlying: &str) -> Classification {
    Classification::new(
        ErrorKind::NetworkUnreachable,
        format!(
            "Could not reach the remote agent ({}). Please check the webhook URL or your network connection.",
            underlying
        ),
    )
}

fn remote_error(status: u16) -> Classification {
    Classification::new(
        ErrorKind::RemoteError(status),
        format!("The remote agent responded with HTTP {}.", status),
    )
}

fn status_in_message(raw: &str) -> Option<u16> {
    STATUS_IN_MESSAGE
        .captures(raw)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u16>().ok())
}

/// `reqwest::Error` displays only its outermost layer; the useful part (refused, DNS) is
/// usually further down the source chain.
fn error_chain(e: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![e.to_string()];
    let mut source = e.source();
    while let Some(s) = source {
        let text = s.to_string();
        if !parts.iter().any(|p| p.contains(&text)) {
            parts.push(text);
        }
        source = s.source();
    }
    parts.join(": ")
}

/// `60` for whole seconds, `0.5` otherwise.
pub(crate) fn format_secs(d: Duration) -> String {
    if d.subsec_millis() == 0 {
        d.as_secs().to_string()
    } else {
        format!("{:.1}", d.as_secs_f64())
    }
}
