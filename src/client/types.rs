//! Per-dispatch observability types.

use crate::error_kind::ErrorKind;
use std::time::Duration;

/// Facts about one dispatch, for logs and for presentation (latency, status).
#[derive(Debug, Clone)]
pub struct DispatchStats {
    /// Client-generated correlation id, also sent as `x-agent-webhook-request-id`.
    pub request_id: String,
    /// Status of the response, when one arrived before the deadline.
    pub http_status: Option<u16>,
    pub duration_ms: u128,
    pub deadline: Duration,
    pub error_kind: Option<ErrorKind>,
}
