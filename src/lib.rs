//! Dual-transport request executor.
//!
//! Issues asynchronous requests over either a native request/response primitive
//! or a script-injection ("JSONP") channel, behind one completion contract.

pub mod backend;
pub mod config;
pub mod observability;
pub mod platform;
pub mod transport;

pub use backend::{HttpBackend, OutstandingRequests};
pub use config::BackendConfig;
pub use transport::{Completion, Payload, RequestDescriptor, TimeoutSpec, TransportError};
