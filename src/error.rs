use std::fmt;
use thiserror::Error;

/// Where a setup or input failure came from.
///
/// Rendered after the error message as ` (field: .., details: .., source: ..)`, omitting
/// whatever is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// Settings key at fault, e.g. `settings.endpoint_url`.
    pub field_path: Option<String>,
    pub details: Option<String>,
    /// Component that rejected the value, e.g. `chat_session`.
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    fn is_empty(&self) -> bool {
        self.field_path.is_none() && self.details.is_none() && self.source.is_none()
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        let labelled = [
            ("field", &self.field_path),
            ("details", &self.details),
            ("source", &self.source),
        ];
        let parts: Vec<String> = labelled
            .iter()
            .filter_map(|(label, value)| value.as_ref().map(|v| format!("{label}: {v}")))
            .collect();
        write!(f, " ({})", parts.join(", "))
    }
}

/// Crate error type.
///
/// Dispatches never surface this type: every call to the remote agent resolves to an
/// [`Outcome`](crate::types::outcome::Outcome). `Error` covers everything around the call:
/// loading and saving settings, validating an endpoint URL, building the HTTP client, and
/// rejecting input the session will not send.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{context}")]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings file error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_rendered_into_message() {
        let err = Error::configuration_with_context(
            "no endpoint configured",
            ErrorContext::new()
                .with_field_path("settings.endpoint_url")
                .with_source("chat_session"),
        );
        assert_eq!(
            err.to_string(),
            "Configuration error: no endpoint configured (field: settings.endpoint_url, source: chat_session)"
        );
        assert!(err.context().is_some());
    }

    #[test]
    fn empty_context_adds_nothing() {
        let err = Error::validation_with_context("message is empty", ErrorContext::default());
        assert_eq!(err.to_string(), "Validation error: message is empty");
    }

    #[test]
    fn io_and_yaml_failures_carry_no_context() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(err.context().is_none());
        let err: Error = serde_yaml::from_str::<u64>("[not, a, number]").unwrap_err().into();
        assert!(err.to_string().starts_with("Settings file error"));
    }
}
