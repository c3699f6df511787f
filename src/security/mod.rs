//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (bounded body read)
//!     → handler
//!         → access_control.rs (download host allow-list, image root containment)
//! ```
//!
//! # Design Decisions
//! - Policies are built once from config and never change at runtime
//! - Both access policies default to permissive; startup logs a warning

pub mod access_control;
pub mod limits;

pub use access_control::{HostPolicy, ImageRoot};
