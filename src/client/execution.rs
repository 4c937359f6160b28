//! Dispatch execution: one POST raced against its deadline.
//!
//! The call and a deadline timer run as two concurrent tasks sharing a
//! `CancellationToken`. Whichever finishes first decides the outcome; the loser is dropped.

use crate::error_kind::ErrorKind;
use crate::transport::TransportError;
use crate::types::outcome::Outcome;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use super::core::AgentClient;
use super::error_classification::{ErrorClassifier, RawError};
use super::normalize::normalize;
use super::types::DispatchStats;

/// How the response body is read once the status line is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyPolicy {
    /// Chat sends: a non-2xx status short-circuits before the body is touched, and a body
    /// that fails or stalls fails the whole exchange.
    SuccessOnly,
    /// Probes: every body is read, but the status alone decides the exchange. A body that
    /// fails or stalls after the status arrived is recorded as incomplete.
    Always,
}

/// Status line plus (maybe) the full body of one completed exchange.
#[derive(Debug)]
pub(crate) struct RawReply {
    pub status: u16,
    pub status_text: String,
    pub body: Option<Vec<u8>>,
    /// The body read was attempted but did not finish (error or deadline).
    pub body_incomplete: bool,
}

impl RawReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Await `fut` unless `token` fires first.
async fn until_cancelled<T>(
    token: &CancellationToken,
    fut: impl Future<Output = std::result::Result<T, RawError>>,
) -> std::result::Result<T, RawError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(RawError::Cancelled),
        r = fut => r,
    }
}

impl AgentClient {
    /// Perform one exchange under `deadline`. Connect, headers and body read are all covered.
    pub(crate) async fn exchange(
        &self,
        url: &str,
        message: &str,
        deadline: Duration,
        policy: BodyPolicy,
        request_id: &str,
    ) -> std::result::Result<RawReply, RawError> {
        let token = CancellationToken::new();
        let timer = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(deadline).await;
                token.cancel();
            })
        };

        let result = self
            .exchange_until(&token, url, message, policy, request_id)
            .await;
        timer.abort();
        result
    }

    async fn exchange_until(
        &self,
        token: &CancellationToken,
        url: &str,
        message: &str,
        policy: BodyPolicy,
        request_id: &str,
    ) -> std::result::Result<RawReply, RawError> {
        let payload = serde_json::json!({ "message": message });

        let resp = until_cancelled(token, async {
            Ok::<_, RawError>(
                self.transport
                    .post_json(url, &payload, Some(request_id))
                    .await?,
            )
        })
        .await?;

        let status = resp.status();
        let status_text = status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        let mut reply = RawReply {
            status: status.as_u16(),
            status_text,
            body: None,
            body_incomplete: false,
        };
        if !status.is_success() && policy == BodyPolicy::SuccessOnly {
            return Ok(reply);
        }

        let read = until_cancelled(token, async {
            resp.bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| RawError::from(TransportError::Http(e)))
        })
        .await;

        match (read, policy) {
            (Ok(bytes), _) => reply.body = Some(bytes),
            (Err(e), BodyPolicy::SuccessOnly) => return Err(e),
            (Err(e), BodyPolicy::Always) => {
                debug!(
                    request_id,
                    status = reply.status,
                    "response body incomplete: {e}"
                );
                reply.body_incomplete = true;
            }
        }
        Ok(reply)
    }

    /// Chat dispatch with an explicit deadline, returning per-call stats alongside the outcome.
    pub async fn send_with_stats(
        &self,
        url: &str,
        message: &str,
        deadline: Duration,
    ) -> (Outcome, DispatchStats) {
        let request_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        debug!(
            request_id = request_id.as_str(),
            deadline_ms = deadline.as_millis() as u64,
            "dispatching message to remote agent"
        );

        let (outcome, http_status) = match self
            .exchange(url, message, deadline, BodyPolicy::SuccessOnly, &request_id)
            .await
        {
            Err(e) => {
                let c = ErrorClassifier::new(deadline).classify(&e);
                (Outcome::failure(c.kind, c.message), None)
            }
            Ok(reply) => {
                let status = reply.status;
                (reply_to_outcome(reply), Some(status))
            }
        };

        let stats = DispatchStats {
            request_id,
            http_status,
            duration_ms: start.elapsed().as_millis(),
            deadline,
            error_kind: outcome.kind(),
        };
        info!(
            request_id = stats.request_id.as_str(),
            http_status = stats.http_status,
            duration_ms = stats.duration_ms as u64,
            error_kind = stats.error_kind.map(|k| k.name()),
            "remote agent dispatch finished"
        );
        (outcome, stats)
    }

    /// Chat dispatch with an explicit deadline.
    pub async fn send_with_deadline(&self, url: &str, message: &str, deadline: Duration) -> Outcome {
        self.send_with_stats(url, message, deadline).await.0
    }

    /// Chat dispatch under the client's chat deadline (60 seconds unless configured).
    pub async fn send(&self, url: &str, message: &str) -> Outcome {
        self.send_with_deadline(url, message, self.chat_deadline)
            .await
    }
}

/// Status and body of a chat exchange to an [`Outcome`].
fn reply_to_outcome(reply: RawReply) -> Outcome {
    if !reply.is_success() {
        return Outcome::failure(ErrorKind::RemoteError(reply.status), reply.status_text);
    }

    let bytes = reply.body.unwrap_or_default();
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            return Outcome::failure(
                ErrorKind::MalformedPayload,
                format!("response body is not valid UTF-8: {}", e.utf8_error()),
            )
        }
    };

    if text.trim().is_empty() {
        return Outcome::failure(
            ErrorKind::EmptyBody,
            "empty response received from the remote agent",
        );
    }

    normalize(&text)
}
