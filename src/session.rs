//! Chat session: the explicit application state around the client.
//!
//! Owns the conversation, the dispatch state and handles to the config store and the
//! notification sink. `send_message` takes `&mut self`, so one session can never have two
//! sends in flight. The dispatch state is published on a `watch` channel so a presentation
//! layer can show a busy indicator while the session itself is borrowed by the send.

use crate::client::{AgentClient, ProbeReport};
use crate::config::{validate_endpoint_url, ConfigStore};
use crate::conversation::ConversationLog;
use crate::notify::{noop_sink, Notification, NotificationSink};
use crate::types::{Message, Outcome};
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Lifecycle of the most recent dispatch: `Idle -> Dispatching -> {Succeeded, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Dispatching,
    Succeeded,
    Failed,
}

/// What one `send_message` produced: the stored assistant message and the outcome behind it.
#[derive(Debug, Clone)]
pub struct Reply {
    pub message: Message,
    pub outcome: Outcome,
}

/// Marks a dispatch in flight. If the send future is dropped before `finish`, the state goes
/// back to `Idle` and nothing is recorded.
struct InFlight<'a> {
    state: &'a watch::Sender<DispatchState>,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a watch::Sender<DispatchState>) -> Self {
        state.send_replace(DispatchState::Dispatching);
        Self {
            state,
            finished: false,
        }
    }

    fn finish(mut self, end: DispatchState) {
        self.finished = true;
        self.state.send_replace(end);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.state.send_replace(DispatchState::Idle);
        }
    }
}

pub struct ChatSession {
    client: AgentClient,
    store: Arc<dyn ConfigStore>,
    log: ConversationLog,
    notifier: Arc<dyn NotificationSink>,
    state: watch::Sender<DispatchState>,
}

impl ChatSession {
    pub fn new(client: AgentClient, store: Arc<dyn ConfigStore>) -> Self {
        let (state, _) = watch::channel(DispatchState::Idle);
        Self {
            client,
            store,
            log: ConversationLog::new(),
            notifier: noop_sink(),
            state,
        }
    }

    /// Inject a notification sink. Default is a no-op sink.
    pub fn with_notifier(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.notifier = sink;
        self
    }

    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    pub fn state(&self) -> DispatchState {
        *self.state.borrow()
    }

    /// Receiver for dispatch state changes. Stays readable while a send borrows the session.
    pub fn watch_state(&self) -> watch::Receiver<DispatchState> {
        self.state.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.state() == DispatchState::Dispatching
    }

    /// Endpoint the next send would use.
    pub fn endpoint(&self) -> Option<String> {
        self.store.get()
    }

    /// Send `text` to the remote agent and record both sides of the exchange.
    ///
    /// Blank input and a missing endpoint are rejected before anything is recorded. Both
    /// messages are appended only once the outcome is known: the user's text, then the reply
    /// on success or an explanation of the failure. Dropping the returned future mid-flight
    /// records nothing and resets the state to `Idle`.
    pub async fn send_message(&mut self, text: &str) -> Result<Reply> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::validation_with_context(
                "message is empty",
                ErrorContext::new().with_source("chat_session"),
            ));
        }
        // Read once: a change made while this call is in flight applies to the next send.
        let url = self.store.get().ok_or_else(|| {
            Error::configuration_with_context(
                "no webhook URL configured",
                ErrorContext::new()
                    .with_field_path("settings.endpoint_url")
                    .with_source("chat_session"),
            )
        })?;

        let question = Message::user(text);
        let in_flight = InFlight::begin(&self.state);

        let outcome = self.client.send(&url, text).await;

        in_flight.finish(if outcome.is_success() {
            DispatchState::Succeeded
        } else {
            DispatchState::Failed
        });
        self.log.append(question);
        if let Some(kind) = outcome.kind() {
            self.notify(Notification::error(format!(
                "Failed to get a response ({}). Please check your webhook URL or try again later.",
                kind
            )))
            .await;
        }

        let message = self
            .log
            .append(Message::assistant(outcome.reply_text()))
            .clone();
        Ok(Reply { message, outcome })
    }

    /// Empty the conversation.
    pub async fn clear(&mut self) {
        self.log.clear();
        self.state.send_replace(DispatchState::Idle);
        self.notify(Notification::success("Chat cleared")).await;
    }

    /// Validate and store a new endpoint URL, then probe it in the background.
    ///
    /// The save does not depend on the probe. The probe only reports success; its failure is
    /// logged at debug level and otherwise dropped. The returned handle resolves when the
    /// probe finishes; dropping it detaches the probe.
    pub async fn save_endpoint(&self, url: &str) -> Result<JoinHandle<()>> {
        let url = validate_endpoint_url(url)?;
        self.store.set(&url)?;
        self.notify(Notification::success("Webhook URL updated successfully"))
            .await;

        let client = self.client.clone();
        let notifier = self.notifier.clone();
        Ok(tokio::spawn(async move {
            let report = client.test_connection(&url).await;
            if report.ok {
                if let Err(e) = notifier.notify(Notification::success(report.message)).await {
                    debug!("notification sink rejected a notification: {e}");
                }
            } else {
                debug!(
                    url = url.as_str(),
                    kind = report.kind.map(|k| k.name()),
                    "background connection probe failed: {}",
                    report.message
                );
            }
        }))
    }

    /// Probe `url`, or the stored endpoint when `None`, and notify the result.
    pub async fn test_endpoint(&self, url: Option<&str>) -> Result<ProbeReport> {
        let url = match url {
            Some(u) => validate_endpoint_url(u)?,
            None => self.store.get().ok_or_else(|| {
                Error::configuration_with_context(
                    "no webhook URL configured",
                    ErrorContext::new()
                        .with_field_path("settings.endpoint_url")
                        .with_source("chat_session"),
                )
            })?,
        };

        let report = self.client.test_connection(&url).await;
        let notification = if report.ok {
            Notification::success(report.message.clone())
        } else {
            Notification::error(report.message.clone())
        };
        self.notify(notification).await;
        Ok(report)
    }

    async fn notify(&self, notification: Notification) {
        if let Err(e) = self.notifier.notify(notification).await {
            debug!("notification sink rejected a notification: {e}");
        }
    }
}
