//! Client for the remote agent.
//!
//! Keep the public surface small: a client that dispatches (`send`) and probes
//! (`test_connection`), plus the pure pieces it is built from. Implementation details live in
//! submodules under `src/client/`.

pub mod builder;
pub mod core;
pub mod error_classification;
mod execution;
pub mod normalize;
pub mod probe;
pub mod types;

pub use builder::AgentClientBuilder;
pub use core::AgentClient;
pub use error_classification::{Classification, ErrorClassifier, RawError};
pub use normalize::{normalize, REPLY_KEYS};
pub use probe::{ProbeReport, PROBE_MESSAGE};
pub use types::DispatchStats;
