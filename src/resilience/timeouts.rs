//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap upstream calls with a deadline
//! - Cancel the wrapped future cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - Timed-out requests return 504 Gateway Timeout

use std::future::Future;
use std::time::Duration;

use crate::http::response::ProxyError;

/// Run an upstream operation under a deadline.
pub async fn with_timeout<F, T, E>(deadline: Duration, operation: F) -> Result<T, ProxyError>
where
    F: Future<Output = Result<T, E>>,
    ProxyError: From<E>,
{
    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result.map_err(ProxyError::from),
        Err(_) => Err(ProxyError::UpstreamTimeout),
    }
}
