//! Streaming download passthrough.
//!
//! Fetches a caller-supplied URL and pipes the body to the client as it
//! arrives. hyper only polls the body stream when the client socket can take
//! more data, so backpressure reaches the upstream connection and memory use
//! stays flat regardless of payload size.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{ACCEPT_RANGES, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderName, HeaderValue, StatusCode,
    },
    response::Response,
};
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::http::request::RawBody;
use crate::http::response::ProxyError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::resilience::timeouts::with_timeout;

/// Filename used when neither the caller nor the URL provides one.
const FALLBACK_FILENAME: &str = "download.bin";

/// Maximum characters of an upstream error body echoed back as `detail`.
const DETAIL_CHARS: usize = 300;

/// Upstream headers copied onto the client response.
const PASSTHROUGH_HEADERS: [HeaderName; 3] = [CONTENT_TYPE, CONTENT_LENGTH, ACCEPT_RANGES];

/// Body of `POST /api/proxy/download`.
///
/// Fields are kept as raw JSON values and judged by truthiness: a falsy
/// `url` is missing, any other non-string `url` is invalid, and `filename`
/// is only used when it is a non-empty string or a non-zero number.
#[derive(Debug, Default, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub url: Value,
    #[serde(default)]
    pub filename: Value,
}

impl DownloadRequest {
    /// Parse the raw body. Valid JSON that is not an object carries no fields.
    pub fn parse(raw: &str) -> Result<Self, ProxyError> {
        let value: Value = serde_json::from_str(raw)?;
        match value {
            Value::Object(_) => Ok(serde_json::from_value(value)?),
            _ => Ok(Self::default()),
        }
    }

    pub fn target(&self) -> Result<Url, ProxyError> {
        if !is_truthy(&self.url) {
            return Err(ProxyError::MissingUrl);
        }
        let url = self.url.as_str().ok_or(ProxyError::InvalidUrl)?;
        Url::parse(url).map_err(|_| ProxyError::InvalidUrl)
    }

    pub fn filename(&self) -> Option<String> {
        match &self.filename {
            Value::String(name) if !name.is_empty() => Some(name.clone()),
            Value::Number(n) if is_truthy(&self.filename) => Some(n.to_string()),
            _ => None,
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Handler for `POST /api/proxy/download`.
pub async fn download(State(state): State<AppState>, body: RawBody) -> Result<Response, ProxyError> {
    let request = DownloadRequest::parse(body.as_str())?;
    let target = request.target()?;

    state.host_policy.check(&target)?;

    tracing::info!(url = %target, "Starting download passthrough");

    let upstream = with_timeout(state.upstream_timeout, state.client.get(target.clone()).send()).await?;
    let status = upstream.status();
    if !status.is_success() {
        let detail = read_detail(upstream).await;
        return Err(ProxyError::UpstreamStatus {
            status: status.as_u16(),
            detail,
        });
    }

    let basename = attachment_name(request.filename().as_deref(), &target);

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_DISPOSITION, content_disposition(&basename)?);
    for name in PASSTHROUGH_HEADERS {
        if let Some(value) = upstream.headers().get(&name) {
            response = response.header(name, value.clone());
        }
    }
    response = response.header(ACCESS_CONTROL_ALLOW_ORIGIN, "*");

    let source = target.to_string();
    let stream = upstream.bytes_stream().map(move |chunk| match chunk {
        Ok(bytes) => {
            metrics::record_download_bytes(bytes.len());
            Ok(bytes)
        }
        Err(e) => {
            // hyper aborts the response when the body yields an error.
            tracing::error!(url = %source, error = %e, "Download stream failed");
            Err(std::io::Error::other(e))
        }
    });

    Ok(response.body(Body::from_stream(stream))?)
}

/// Name offered to the client: caller's filename, else last URL segment.
pub fn attachment_name(filename: Option<&str>, target: &Url) -> String {
    if let Some(name) = filename.filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    target
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or(FALLBACK_FILENAME)
        .to_string()
}

/// `attachment; filename="..."` with quotes and backslashes escaped.
pub fn content_disposition(basename: &str) -> Result<HeaderValue, ProxyError> {
    let escaped = basename.replace('\\', "\\\\").replace('"', "\\\"");
    let value = format!("attachment; filename=\"{}\"", escaped);
    Ok(HeaderValue::from_bytes(value.as_bytes())?)
}

/// Read enough of an error body to produce a truncated detail.
async fn read_detail(mut upstream: reqwest::Response) -> String {
    // A UTF-8 char is at most 4 bytes.
    let budget = DETAIL_CHARS * 4;
    let mut buf = Vec::new();
    while buf.len() < budget {
        match upstream.chunk().await {
            Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read upstream error body");
                break;
            }
        }
    }
    truncate_detail(&String::from_utf8_lossy(&buf))
}

pub fn truncate_detail(text: &str) -> String {
    text.chars().take(DETAIL_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn filename_wins_over_url() {
        let target = url("https://cdn.example/videos/clip.mp4");
        assert_eq!(attachment_name(Some("mine.mp4"), &target), "mine.mp4");
    }

    #[test]
    fn empty_filename_falls_back_to_url_segment() {
        let target = url("https://cdn.example/videos/clip.mp4?sig=abc");
        assert_eq!(attachment_name(Some(""), &target), "clip.mp4");
        assert_eq!(attachment_name(None, &target), "clip.mp4");
    }

    #[test]
    fn trailing_slash_uses_last_nonempty_segment() {
        assert_eq!(attachment_name(None, &url("https://cdn.example/videos/")), "videos");
    }

    #[test]
    fn bare_host_uses_fallback() {
        assert_eq!(attachment_name(None, &url("https://cdn.example")), FALLBACK_FILENAME);
        assert_eq!(attachment_name(None, &url("https://cdn.example/")), FALLBACK_FILENAME);
    }

    #[test]
    fn disposition_escapes_quotes() {
        let value = content_disposition("a\"b.mp4").unwrap();
        assert_eq!(value, "attachment; filename=\"a\\\"b.mp4\"");
    }

    #[test]
    fn disposition_rejects_control_characters() {
        assert!(matches!(
            content_disposition("evil\r\nSet-Cookie: x"),
            Err(ProxyError::InvalidHeader(_))
        ));
    }

    #[test]
    fn detail_is_truncated_by_chars() {
        let long = "é".repeat(400);
        assert_eq!(truncate_detail(&long).chars().count(), 300);
        assert_eq!(truncate_detail("short"), "short");
    }

    #[test]
    fn absent_or_falsy_url_is_missing() {
        for raw in ["{}", r#"{"url":null}"#, r#"{"url":false}"#, r#"{"url":0}"#, r#"{"url":""}"#, "[]", "42"] {
            let req = DownloadRequest::parse(raw).unwrap();
            assert!(matches!(req.target(), Err(ProxyError::MissingUrl)), "{raw}");
        }
    }

    #[test]
    fn truthy_non_string_url_is_invalid() {
        for raw in [r#"{"url":123}"#, r#"{"url":true}"#, r#"{"url":["https://a.example/x"]}"#, r#"{"url":{"href":"x"}}"#] {
            let req = DownloadRequest::parse(raw).unwrap();
            assert!(matches!(req.target(), Err(ProxyError::InvalidUrl)), "{raw}");
        }
    }

    #[test]
    fn string_url_is_parsed() {
        let req = DownloadRequest::parse(r#"{"url":"https://cdn.example/a.mp4","extra":1}"#).unwrap();
        assert_eq!(req.target().unwrap().host_str(), Some("cdn.example"));
    }

    #[test]
    fn filename_accepts_strings_and_numbers_only() {
        let name = |raw: &str| DownloadRequest::parse(raw).unwrap().filename();
        assert_eq!(name(r#"{"filename":"a.mp4"}"#).as_deref(), Some("a.mp4"));
        assert_eq!(name(r#"{"filename":7}"#).as_deref(), Some("7"));
        assert_eq!(name(r#"{"filename":0}"#), None);
        assert_eq!(name(r#"{"filename":""}"#), None);
        assert_eq!(name(r#"{"filename":true}"#), None);
        assert_eq!(name(r#"{"filename":{"x":1}}"#), None);
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        assert!(matches!(DownloadRequest::parse("{\"url\":"), Err(ProxyError::Json(_))));
    }
}
