//! Connection probe: validates an endpoint before it is committed to the config store.
//!
//! Success is decided by HTTP status alone. The body is only looked at to word the report,
//! so endpoints that do not answer in a chat shape, answer with nothing, or stall after the
//! status line still pass.

use crate::error_kind::ErrorKind;
use tracing::info;
use uuid::Uuid;

use super::core::AgentClient;
use super::error_classification::ErrorClassifier;
use super::execution::{BodyPolicy, RawReply};

/// Fixed payload text sent by every probe.
pub const PROBE_MESSAGE: &str = "Connection test";

/// Result of one probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub ok: bool,
    pub message: String,
    pub http_status: Option<u16>,
    /// Failure kind; `None` when `ok`.
    pub kind: Option<ErrorKind>,
}

impl ProbeReport {
    pub fn into_parts(self) -> (bool, String) {
        (self.ok, self.message)
    }
}

impl AgentClient {
    /// Probe `url` with the fixed payload under the probe deadline.
    pub async fn test_connection(&self, url: &str) -> ProbeReport {
        let deadline = self.probe_deadline;
        let request_id = Uuid::new_v4().to_string();

        let report = match self
            .exchange(url, PROBE_MESSAGE, deadline, BodyPolicy::Always, &request_id)
            .await
        {
            Ok(reply) => report_from_reply(reply),
            Err(e) => {
                let c = ErrorClassifier::new(deadline).classify(&e);
                ProbeReport {
                    ok: false,
                    message: format!("Connection failed: {}", c.message),
                    http_status: None,
                    kind: Some(c.kind),
                }
            }
        };

        info!(
            request_id = request_id.as_str(),
            ok = report.ok,
            http_status = report.http_status,
            "connection probe finished"
        );
        report
    }
}

fn report_from_reply(reply: RawReply) -> ProbeReport {
    let body = reply
        .body
        .as_deref()
        .map(String::from_utf8_lossy)
        .unwrap_or_default();
    let body = body.trim();

    if reply.is_success() {
        let detail = if reply.body_incomplete {
            "the endpoint is reachable (response body incomplete)"
        } else if body.is_empty() {
            "the endpoint is reachable (empty response)"
        } else if serde_json::from_str::<serde_json::Value>(body).is_ok() {
            "response format looks good"
        } else {
            "the endpoint is reachable, but the response is not JSON"
        };
        return ProbeReport {
            ok: true,
            message: format!("Connection successful! {}", capitalize(detail)),
            http_status: Some(reply.status),
            kind: None,
        };
    }

    // Prefer an error message the endpoint put in its JSON body over the bare status text.
    let reason = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(reply.status_text);

    ProbeReport {
        ok: false,
        message: format!("Connection failed: HTTP {} ({})", reply.status, reason),
        http_status: Some(reply.status),
        kind: Some(ErrorKind::RemoteError(reply.status)),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
