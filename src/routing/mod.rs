//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → axum Router (exact path match, built once in http::server)
//!     → endpoints.rs (local path ↔ upstream path for forwarding routes)
//! ```
//!
//! # Design Decisions
//! - Routes are static and compiled at startup
//! - Single upstream host; the table only maps paths
//! - No path rewriting beyond the fixed table

pub mod endpoints;

pub use endpoints::SandboxEndpoint;
