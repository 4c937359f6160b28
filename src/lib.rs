//! # agent-webhook
//!
//! Chat client for a single remote agent reachable over HTTP (for example an n8n or
//! similar workflow webhook).
//!
//! ## Overview
//!
//! The remote agent's reply shape is not under our control: it may answer with a JSON array,
//! a JSON object, a bare JSON string, or plain text, and it may take arbitrarily long. This
//! crate turns every exchange into exactly one [`Outcome`]: canonical reply text, or a typed
//! failure with a human-readable explanation.
//!
//! - **Deadline-bounded dispatch**: each POST races a cancellation token (60 s for chat,
//!   15 s for connection probes by default)
//! - **Reply normalization**: ordered key search (`output`, `response`, `message`, `text`,
//!   `content`, `answer`), first element of arrays, plain-text fallback
//! - **Failure taxonomy**: [`ErrorKind`] covers timeouts, unreachable endpoints, HTTP errors,
//!   empty, undecodable and unrecognized bodies
//! - **Session state**: [`ChatSession`] keeps the conversation, dispatch state, endpoint
//!   store and notifications together
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agent_webhook::{AgentClient, ChatSession, MemoryConfigStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> agent_webhook::Result<()> {
//!     let store = Arc::new(MemoryConfigStore::with_url("https://example.com/webhook/chat")?);
//!     let mut session = ChatSession::new(AgentClient::new()?, store);
//!
//!     let reply = session.send_message("Hello, how are you?").await?;
//!     println!("{}", reply.message.content);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Dispatcher, normalizer, classifier and connection probe |
//! | [`config`] | Settings file, env overrides and endpoint stores |
//! | [`conversation`] | Append-only message log |
//! | [`session`] | Chat session state |
//! | [`notify`] | Transient notification sinks |
//! | [`types`] | Messages and outcomes |

pub mod client;
pub mod config;
pub mod conversation;
pub mod error_kind;
pub mod notify;
pub mod session;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{AgentClient, AgentClientBuilder, DispatchStats, ProbeReport};
pub use config::{ConfigStore, FileConfigStore, MemoryConfigStore, Settings};
pub use conversation::ConversationLog;
pub use error_kind::ErrorKind;
pub use notify::{Notification, NotificationLevel, NotificationSink};
pub use session::{ChatSession, DispatchState, Reply};
pub use types::{Message, MessageRole, Outcome};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
