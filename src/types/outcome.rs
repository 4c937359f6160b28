//! Result of a single dispatch.

use crate::error_kind::ErrorKind;
use serde::Serialize;

/// Produced exactly once per dispatch; never partially filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Success { content: String },
    Failure { kind: ErrorKind, detail: String },
}

impl Outcome {
    pub fn success(content: impl Into<String>) -> Self {
        Outcome::Success {
            content: content.into(),
        }
    }

    pub fn failure(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Outcome::Failure {
            kind,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// Canonical reply text, if the dispatch succeeded.
    pub fn content(&self) -> Option<&str> {
        match self {
            Outcome::Success { content } => Some(content),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Text to show as the assistant's message for this outcome.
    ///
    /// Failures are turned into an explanation specific to their kind. Timeout, network and
    /// unknown details already come out of the classifier in user-facing form.
    pub fn reply_text(&self) -> String {
        match self {
            Outcome::Success { content } => content.clone(),
            Outcome::Failure { kind, detail } => match kind {
                ErrorKind::Timeout | ErrorKind::NetworkUnreachable | ErrorKind::Unknown => {
                    detail.clone()
                }
                ErrorKind::RemoteError(status) => format!(
                    "The remote agent responded with HTTP {} ({}). Please check your webhook URL or try again later.",
                    status, detail
                ),
                ErrorKind::EmptyBody => {
                    "The remote agent returned an empty response. Please try again later."
                        .to_string()
                }
                ErrorKind::MalformedPayload => format!(
                    "The remote agent's response could not be decoded ({}).",
                    detail
                ),
                ErrorKind::UnrecognizedShape => format!(
                    "Sorry, I couldn't read a reply from the remote agent ({}).",
                    detail
                ),
            },
        }
    }
}
