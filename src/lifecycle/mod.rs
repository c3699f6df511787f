//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     .env → config → logging → credential → HttpServer → bind
//!
//! Shutdown (shutdown.rs):
//!     Trigger latches a watch flag → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: a missing credential or invalid config is fatal at startup
//! - Listener binds last, so traffic only arrives when ready
//! - A trigger that fires before a task subscribes is still observed

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
