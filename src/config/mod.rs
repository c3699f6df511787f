//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (PORT)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!
//! GOOGLE_BEARER
//!     → credential.rs (BearerCredential, redacted)
//!
//! Both are handed to HttpServer once and shared via AppState.
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults to allow minimal configs
//! - The credential never lives in the config file

pub mod credential;
pub mod loader;
pub mod schema;
pub mod validation;

pub use credential::BearerCredential;
pub use loader::ConfigError;
pub use schema::{
    CorsConfig, DownloadConfig, ImageConfig, LimitsConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, ProxyConfig, TimeoutConfig, UpstreamConfig,
};
