//! Request capture and identification.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Answer OPTIONS preflights with 204 before any handler runs
//! - Read the whole body once and expose it as an immutable `RawBody`
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The body is captured as text and never parsed here; forwarding
//!   routes send it upstream exactly as received
//! - Handlers never touch the body stream; they extract `RawBody`

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::config::ProxyConfig;
use crate::http::response::ProxyError;
use crate::security::limits::read_body;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a UUID v4 request ID for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The inbound body, captured once as UTF-8 text.
#[derive(Debug, Clone, Default)]
pub struct RawBody(Arc<str>);

impl RawBody {
    /// Decode captured bytes. Invalid UTF-8 sequences become U+FFFD.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(Arc::from(String::from_utf8_lossy(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the body is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for RawBody {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

impl<S> FromRequestParts<S> for RawBody
where
    S: Send + Sync,
{
    type Rejection = ProxyError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RawBody>()
            .cloned()
            .ok_or(ProxyError::RawBodyMissing)
    }
}

/// Limits applied while capturing the body.
#[derive(Debug, Clone, Copy)]
pub struct CaptureSettings {
    pub max_body_bytes: usize,
    pub read_timeout: Duration,
}

impl CaptureSettings {
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self {
            max_body_bytes: config.limits.max_body_bytes,
            read_timeout: Duration::from_secs(config.timeouts.body_read_secs),
        }
    }
}

/// Middleware: short-circuit OPTIONS, otherwise capture the body.
///
/// For OPTIONS the inner CORS layer produces the preflight headers and never
/// reaches a route handler; the status is normalized to 204 with no body.
pub async fn capture_raw_body(
    State(settings): State<CaptureSettings>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        let mut response = next.run(request).await;
        *response.status_mut() = StatusCode::NO_CONTENT;
        *response.body_mut() = Body::empty();
        return response;
    }

    let (mut parts, body) = request.into_parts();
    let bytes = match read_body(body, settings.max_body_bytes, settings.read_timeout).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(method = %parts.method, path = %parts.uri.path(), error = %e, "Failed to capture request body");
            return e.into_response();
        }
    };

    tracing::trace!(path = %parts.uri.path(), bytes = bytes.len(), "Captured request body");
    parts.extensions.insert(RawBody::from_bytes(&bytes));

    next.run(Request::from_parts(parts, Body::empty())).await
}
