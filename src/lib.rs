//! Sandbox API reverse proxy library.
//!
//! Forwards a fixed set of calls to the sandbox API with a server-held bearer
//! credential, streams downloads, and serves local preview images.

pub mod config;
pub mod http;
pub mod routing;

pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;

pub use config::{BearerCredential, ProxyConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
