//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Per request:
//!     → tower-http TraceLayer span
//!     → x-request-id generated (http::request) and echoed on the response
//! ```
//!
//! # Design Decisions
//! - Structured fields, never interpolated secrets
//! - Metrics exporter is opt-in

pub mod logging;
pub mod metrics;
