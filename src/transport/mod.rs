//! HTTP transport to the remote agent.

mod http;

pub use http::{HttpTransport, TransportError};
