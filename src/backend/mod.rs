//! Request orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → orchestrator.rs (track outstanding, resolve URL, pick transport)
//!     → transport::direct | transport::script
//!     → Completion back to caller
//!     → outstanding.rs guard released
//! ```

pub mod orchestrator;
pub mod outstanding;

pub use orchestrator::{HttpBackend, TransportKind};
pub use outstanding::{OutstandingRequests, RequestGuard, RequestId};
