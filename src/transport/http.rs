use crate::Result;
use reqwest::Proxy;
use std::env;
use std::time::Duration;

/// Thin wrapper around a pooled `reqwest::Client` for posting JSON to webhook URLs.
///
/// No client-level timeout is configured: deadlines belong to the dispatcher, which races
/// every exchange against its own cancellation token.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(
                env::var("AGENT_WEBHOOK_POOL_MAX_IDLE_PER_HOST")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(8),
            )
            .pool_idle_timeout(Some(Duration::from_secs(
                env::var("AGENT_WEBHOOK_POOL_IDLE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(90),
            )));

        if let Ok(proxy_url) = env::var("AGENT_WEBHOOK_PROXY_URL") {
            match Proxy::all(&proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => tracing::warn!(proxy = proxy_url.as_str(), "ignoring invalid proxy url: {e}"),
            }
        }

        let client = builder
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self { client })
    }

    /// Wrap an already configured client (tests, custom TLS setups).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// POST `body` as JSON to `url`. Resolves once response headers arrive.
    pub async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        client_request_id: Option<&str>,
    ) -> std::result::Result<reqwest::Response, TransportError> {
        // `.json()` sets `Content-Type: application/json`.
        let mut req = self.client.post(url).json(body);
        if let Some(id) = client_request_id {
            // Correlation id for our own logs; endpoints are free to ignore it.
            req = req.header("x-agent-webhook-request-id", id);
        }

        req.send().await.map_err(TransportError::Http)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
