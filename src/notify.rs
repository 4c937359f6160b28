//! Transient user notifications ("toasts").
//!
//! The session reports successes and failures through a [`NotificationSink`] so the
//! presentation layer decides how (or whether) to show them.
//!
//! | Sink | Description |
//! |------|-------------|
//! | [`NoopNotificationSink`] | Default; drops everything |
//! | [`InMemoryNotificationSink`] | Bounded buffer, for tests and UIs that poll |
//! | [`TracingNotificationSink`] | Emits each notification as a `tracing` event |

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

fn timestamp() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
    pub timestamp: f64,
}

impl Notification {
    pub fn new(level: NotificationLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            timestamp: timestamp(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, text)
    }
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<()>;
}

pub struct NoopNotificationSink;

#[async_trait]
impl NotificationSink for NoopNotificationSink {
    async fn notify(&self, _: Notification) -> Result<()> {
        Ok(())
    }
}

pub fn noop_sink() -> Arc<dyn NotificationSink> {
    Arc::new(NoopNotificationSink)
}

/// Bounded in-memory sink. Oldest notifications are evicted first.
pub struct InMemoryNotificationSink {
    events: RwLock<Vec<Notification>>,
    max_events: usize,
}

impl InMemoryNotificationSink {
    pub fn new(max: usize) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            max_events: max.max(1),
        }
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events
            .read()
            .map(|e| e.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn count(&self, level: NotificationLevel) -> usize {
        self.notifications()
            .iter()
            .filter(|n| n.level == level)
            .count()
    }

    pub fn len(&self) -> usize {
        self.notifications().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryNotificationSink {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn notify(&self, notification: Notification) -> Result<()> {
        let mut events = self
            .events
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        events.push(notification);
        if events.len() > self.max_events {
            events.remove(0);
        }
        Ok(())
    }
}

/// Forwards notifications to `tracing` (errors at `warn`, the rest at `info`).
#[derive(Default)]
pub struct TracingNotificationSink;

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn notify(&self, n: Notification) -> Result<()> {
        match n.level {
            NotificationLevel::Error => tracing::warn!(target: "agent_webhook::notify", "{}", n.text),
            NotificationLevel::Success | NotificationLevel::Info => {
                tracing::info!(target: "agent_webhook::notify", "{}", n.text)
            }
        }
        Ok(())
    }
}
