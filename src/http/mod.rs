//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, OPTIONS short-circuit, raw body capture)
//!     → forward.rs | download.rs | image.rs (route handlers)
//!     → response.rs (error → status + body)
//!     → Send to client
//! ```

pub mod download;
pub mod forward;
pub mod image;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RawBody, X_REQUEST_ID};
pub use response::ProxyError;
pub use server::{AppState, HttpServer};
