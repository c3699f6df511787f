//! Response error mapping.
//!
//! # Responsibilities
//! - Map handler failures to HTTP status codes
//! - Render API errors as `{"error": ...}` JSON
//! - Render image errors as plain text
//! - Log server-side failures at the handler boundary
//!
//! # Design Decisions
//! - One error enum for every route; handlers return `Result<Response, ProxyError>`
//! - Upstream failures carry a truncated detail, never the whole body
//! - Timeouts return 504 Gateway Timeout

use axum::{
    http::{header::InvalidHeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error type for proxy handlers.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("request body too large")]
    PayloadTooLarge,

    #[error("request body read timed out")]
    BodyReadTimeout,

    #[error("{0}")]
    BodyRead(String),

    #[error("raw body not captured")]
    RawBodyMissing,

    #[error("missing url")]
    MissingUrl,

    #[error("invalid url")]
    InvalidUrl,

    #[error("host not allowed")]
    HostNotAllowed,

    #[error("upstream {status}")]
    UpstreamStatus { status: u16, detail: String },

    #[error("upstream request timed out")]
    UpstreamTimeout,

    #[error("{0}")]
    Upstream(#[from] reqwest::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Http(#[from] axum::http::Error),

    #[error("{0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    #[error("missing image path")]
    MissingImagePath,

    #[error("unsupported image format")]
    UnsupportedImageFormat,

    #[error("path outside image root")]
    ImageOutsideRoot,

    #[error("image not found")]
    ImageNotFound,
}

impl ProxyError {
    /// Status code sent to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BodyReadTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::BodyRead(_)
            | Self::MissingUrl
            | Self::InvalidUrl
            | Self::HostNotAllowed
            | Self::MissingImagePath
            | Self::UnsupportedImageFormat => StatusCode::BAD_REQUEST,
            Self::ImageOutsideRoot => StatusCode::FORBIDDEN,
            Self::ImageNotFound => StatusCode::NOT_FOUND,
            Self::UpstreamStatus { .. } => StatusCode::BAD_GATEWAY,
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::RawBodyMissing
            | Self::Upstream(_)
            | Self::Json(_)
            | Self::Http(_)
            | Self::InvalidHeader(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_image_error(&self) -> bool {
        matches!(
            self,
            Self::MissingImagePath
                | Self::UnsupportedImageFormat
                | Self::ImageOutsideRoot
                | Self::ImageNotFound
        )
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }

        if self.is_image_error() {
            return (status, self.to_string()).into_response();
        }

        let body = match &self {
            Self::UpstreamStatus { detail, .. } => json!({ "error": self.to_string(), "detail": detail }),
            _ => json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
