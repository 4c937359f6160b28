use crate::transport::HttpTransport;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Default deadline for a chat send.
pub const DEFAULT_CHAT_DEADLINE: Duration = Duration::from_secs(60);

/// Default deadline for a connection probe.
pub const DEFAULT_PROBE_DEADLINE: Duration = Duration::from_secs(15);

/// Stateless client for the remote agent.
///
/// Every call takes the endpoint URL explicitly, so a URL changed between calls is always
/// picked up and a call already in flight keeps the URL it started with. Cheap to clone.
///
/// The client does not serialize concurrent sends; callers that need one-at-a-time
/// behavior (a conversation) enforce it themselves, as [`ChatSession`](crate::ChatSession) does.
#[derive(Debug, Clone)]
pub struct AgentClient {
    pub(crate) transport: Arc<HttpTransport>,
    pub(crate) chat_deadline: Duration,
    pub(crate) probe_deadline: Duration,
}

impl AgentClient {
    /// Client with default deadlines and env-configured transport.
    pub fn new() -> Result<Self> {
        crate::client::builder::AgentClientBuilder::new().build()
    }

    pub fn builder() -> crate::client::builder::AgentClientBuilder {
        crate::client::builder::AgentClientBuilder::new()
    }

    pub fn chat_deadline(&self) -> Duration {
        self.chat_deadline
    }

    pub fn probe_deadline(&self) -> Duration {
        self.probe_deadline
    }
}
