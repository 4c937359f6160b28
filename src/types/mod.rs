//! Core data types shared by the dispatcher, the conversation log and the presentation layer.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | One exchanged chat message (user or assistant) |
//! | [`MessageRole`] | Who authored a message |
//! | [`Outcome`] | Result of exactly one dispatch: reply text or typed failure |
//!
//! ## Example
//!
//! ```rust
//! use agent_webhook::types::{Message, MessageRole, Outcome};
//!
//! let question = Message::user("What's the weather?");
//! assert_eq!(question.role, MessageRole::User);
//!
//! let outcome = Outcome::success("Sunny.");
//! let answer = Message::assistant(outcome.reply_text());
//! assert_eq!(answer.content, "Sunny.");
//! ```

pub mod message;
pub mod outcome;

pub use message::{Message, MessageRole};
pub use outcome::Outcome;
