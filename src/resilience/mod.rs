//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → timeouts.rs (enforce deadline on send / headers / body)
//!     → On expiry: 504 Gateway Timeout
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline
//! - One attempt per request; no retries, no circuit breaking

pub mod timeouts;
