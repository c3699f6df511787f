//! Request body limits.
//!
//! # Responsibilities
//! - Enforce maximum request body size
//! - Enforce a deadline on reading the body
//!
//! # Design Decisions
//! - The body is read through `http_body_util::Limited`, so oversized
//!   streams are cut off as soon as the limit is crossed
//! - Return 413 Payload Too Large or 408 Request Timeout

use axum::body::{Body, Bytes};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use std::time::Duration;

use crate::http::response::ProxyError;

/// Read a whole request body, bounded in size and time.
pub async fn read_body(body: Body, max_bytes: usize, deadline: Duration) -> Result<Bytes, ProxyError> {
    let limited = Limited::new(body, max_bytes);

    match tokio::time::timeout(deadline, limited.collect()).await {
        Ok(Ok(collected)) => Ok(collected.to_bytes()),
        Ok(Err(e)) if e.is::<LengthLimitError>() => Err(ProxyError::PayloadTooLarge),
        Ok(Err(e)) => Err(ProxyError::BodyRead(e.to_string())),
        Err(_) => Err(ProxyError::BodyReadTimeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    const DEADLINE: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn reads_body_under_limit() {
        let bytes = read_body(Body::from("{\"a\":1}"), 64, DEADLINE).await.unwrap();
        assert_eq!(&bytes[..], b"{\"a\":1}");
    }

    #[tokio::test]
    async fn rejects_body_over_limit() {
        let err = read_body(Body::from(vec![b'x'; 65]), 64, DEADLINE).await.unwrap_err();
        assert!(matches!(err, ProxyError::PayloadTooLarge));
    }

    #[tokio::test]
    async fn stalled_body_times_out() {
        let stalled = Body::from_stream(stream::pending::<Result<Bytes, std::io::Error>>());
        let err = read_body(stalled, 64, Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, ProxyError::BodyReadTimeout));
    }

    #[tokio::test]
    async fn stream_error_is_body_read_error() {
        let broken = Body::from_stream(stream::iter(vec![
            Ok(Bytes::from_static(b"{")),
            Err(std::io::Error::other("connection reset")),
        ]));
        let err = read_body(broken, 64, DEADLINE).await.unwrap_err();
        assert!(matches!(err, ProxyError::BodyRead(_)));
    }
}
