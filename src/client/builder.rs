use crate::client::core::{AgentClient, DEFAULT_CHAT_DEADLINE, DEFAULT_PROBE_DEADLINE};
use crate::config::Settings;
use crate::transport::HttpTransport;
use crate::Result;
use std::sync::Arc;
use std::time::Duration;

/// Builder for creating clients with custom deadlines.
///
/// Keep this surface area small and predictable (developer-friendly).
#[derive(Debug, Default)]
pub struct AgentClientBuilder {
    chat_deadline: Option<Duration>,
    probe_deadline: Option<Duration>,
    transport: Option<HttpTransport>,
}

impl AgentClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deadline for chat sends. Zero is bumped to one millisecond.
    pub fn chat_deadline(mut self, deadline: Duration) -> Self {
        self.chat_deadline = Some(deadline.max(Duration::from_millis(1)));
        self
    }

    /// Deadline for connection probes. Zero is bumped to one millisecond.
    pub fn probe_deadline(mut self, deadline: Duration) -> Self {
        self.probe_deadline = Some(deadline.max(Duration::from_millis(1)));
        self
    }

    /// Take both deadlines from loaded settings.
    pub fn with_settings(self, settings: &Settings) -> Self {
        self.chat_deadline(settings.chat_deadline())
            .probe_deadline(settings.probe_deadline())
    }

    /// Use a preconfigured transport instead of the env-configured default.
    pub fn transport(mut self, transport: HttpTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<AgentClient> {
        let transport = match self.transport {
            Some(t) => t,
            None => HttpTransport::new()?,
        };

        Ok(AgentClient {
            transport: Arc::new(transport),
            chat_deadline: self.chat_deadline.unwrap_or(DEFAULT_CHAT_DEADLINE),
            probe_deadline: self.probe_deadline.unwrap_or(DEFAULT_PROBE_DEADLINE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sixty_and_fifteen_seconds() {
        let client = AgentClientBuilder::new().build().unwrap();
        assert_eq!(client.chat_deadline(), Duration::from_secs(60));
        assert_eq!(client.probe_deadline(), Duration::from_secs(15));
    }

    #[test]
    fn settings_drive_deadlines() {
        let settings = Settings {
            chat_timeout_secs: 5,
            probe_timeout_secs: 2,
            ..Settings::default()
        };
        let client = AgentClientBuilder::new()
            .with_settings(&settings)
            .build()
            .unwrap();
        assert_eq!(client.chat_deadline(), Duration::from_secs(5));
        assert_eq!(client.probe_deadline(), Duration::from_secs(2));
    }
}
