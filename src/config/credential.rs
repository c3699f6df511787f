//! Server-held bearer credential.
//!
//! Loaded once at startup and shared read-only by every forwarding call.
//! The client's own `Authorization` header is never used.

use axum::http::HeaderValue;
use std::fmt;

use crate::config::loader::ConfigError;

/// Environment variable holding the upstream bearer token.
pub const CREDENTIAL_ENV: &str = "GOOGLE_BEARER";

/// Pre-built `Authorization: Bearer <token>` header value.
#[derive(Clone)]
pub struct BearerCredential {
    header: HeaderValue,
}

impl BearerCredential {
    /// Build a credential from a raw token.
    pub fn new(token: &str) -> Result<Self, ConfigError> {
        if token.trim().is_empty() {
            return Err(ConfigError::MissingCredential(CREDENTIAL_ENV));
        }
        let mut header = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ConfigError::InvalidCredential(CREDENTIAL_ENV))?;
        header.set_sensitive(true);
        Ok(Self { header })
    }

    /// Read the credential from `GOOGLE_BEARER`.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CREDENTIAL_ENV) {
            Ok(token) => Self::new(&token),
            Err(_) => Err(ConfigError::MissingCredential(CREDENTIAL_ENV)),
        }
    }

    /// Value for the outbound `Authorization` header.
    pub fn authorization(&self) -> HeaderValue {
        self.header.clone()
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerCredential(<redacted>)")
    }
}
