//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! RequestDescriptor
//!     → direct.rs (native request primitive)   → status.rs (normalize quirks)
//!     → script.rs (script injection)           → registry.rs (callback slots)
//!     both arm timeout.rs and disarm it before reporting
//!     → Completion
//! ```
//!
//! # Design Decisions
//! - One attempt per call; retries belong to callers
//! - Every outcome, success or failure, is a `Completion`
//! - First terminal event wins; late events are ignored

pub mod direct;
pub mod registry;
pub mod script;
pub mod status;
pub mod timeout;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use direct::DirectTransport;
pub use registry::CallbackRegistry;
pub use script::ScriptTransport;
pub use timeout::{cancellation_pair, CancellationSignal, Canceller, TimeoutController, TimeoutSpec};
pub use types::{Completion, Payload, RequestDescriptor, TransportError};
