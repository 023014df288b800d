//! Platform capabilities consumed by the transports.
//!
//! # Data Flow
//! ```text
//! transport::direct ──▶ native.rs (NativeRequest trait)
//!                          └─ reqwest_native.rs (HTTP via reqwest, file: via tokio::fs)
//!
//! transport::script ──▶ document.rs (ScriptHost trait)
//!                          └─ http_script_host.rs (fetch + evaluate JSONP calls)
//! ```
//!
//! # Design Decisions
//! - Transports only see the traits; tests substitute in-memory fakes
//! - One primitive per request; primitives are never reused

pub mod document;
pub mod http_script_host;
pub mod native;
pub mod reqwest_native;

pub use document::{ScriptEvent, ScriptHost, ScriptId, ScriptListener};
pub use http_script_host::HttpScriptHost;
pub use native::{NativeEvent, NativeRequest, NativeRequestFactory, NativeResponse, UnsupportedResponseType};
pub use reqwest_native::{ReqwestFactory, ReqwestRequest};
