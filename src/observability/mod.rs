//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! transports / orchestrator produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters and gauges via the metrics facade)
//! ```
//!
//! # Design Decisions
//! - Every request carries a request ID on its span
//! - Metrics are no-ops until the embedding application installs a recorder

pub mod logging;
pub mod metrics;
