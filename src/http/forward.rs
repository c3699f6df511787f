//! Forwarding of sandbox API calls.
//!
//! Every forwarding route does the same thing: take the captured raw body,
//! POST it to a fixed upstream URL with the server credential, and relay the
//! upstream status, content type and body.

use axum::{
    extract::State,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponse, Response},
    routing::{post, MethodRouter},
};
use std::time::Duration;

use crate::config::BearerCredential;
use crate::http::request::RawBody;
use crate::http::response::ProxyError;
use crate::http::server::AppState;
use crate::resilience::timeouts::with_timeout;
use crate::routing::SandboxEndpoint;

/// Content type sent upstream. The sandbox API expects the JSON as text.
const OUTBOUND_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";

/// Content type relayed when the upstream omits one.
const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Relays raw bodies to the sandbox API.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    base_url: String,
    credential: BearerCredential,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        credential: BearerCredential,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            credential,
            timeout,
        }
    }

    /// Forward one captured body to `endpoint` and relay the answer.
    pub async fn forward(&self, endpoint: SandboxEndpoint, body: &RawBody) -> Result<Response, ProxyError> {
        let url = endpoint.upstream_url(&self.base_url);
        let outbound = outbound_body(body);

        tracing::debug!(
            endpoint = endpoint.name(),
            url = %url,
            bytes = outbound.len(),
            "Forwarding request"
        );

        let request = self
            .client
            .post(&url)
            .header(ACCEPT, "*/*")
            .header(AUTHORIZATION, self.credential.authorization())
            .header(CONTENT_TYPE, OUTBOUND_CONTENT_TYPE)
            .body(outbound);

        let (status, content_type, bytes) = with_timeout(self.timeout, async {
            let upstream = request.send().await?;
            let status = upstream.status();
            let content_type = relayed_content_type(upstream.headers());
            let bytes = upstream.bytes().await?;
            Ok::<_, ProxyError>((status, content_type, bytes))
        })
        .await?;

        tracing::debug!(
            endpoint = endpoint.name(),
            status = %status,
            bytes = bytes.len(),
            "Upstream responded"
        );

        Ok((status, [(CONTENT_TYPE, content_type)], bytes).into_response())
    }
}

/// The body sent upstream: the raw text untouched, or `{}` when blank.
pub fn outbound_body(body: &RawBody) -> String {
    if body.is_blank() {
        "{}".to_string()
    } else {
        body.as_str().to_string()
    }
}

/// Upstream content type, or the JSON default when absent.
pub fn relayed_content_type(headers: &HeaderMap) -> HeaderValue {
    headers
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE))
}

/// POST route for one endpoint.
pub fn route(endpoint: SandboxEndpoint) -> MethodRouter<AppState> {
    post(move |State(state): State<AppState>, body: RawBody| async move {
        state.forwarder.forward(endpoint, &body).await
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_body_is_forwarded_unchanged() {
        let raw = "{\"b\": 2,  \"a\": 1.50}\n";
        assert_eq!(outbound_body(&RawBody::from(raw)), raw);
    }

    #[test]
    fn blank_body_becomes_empty_object() {
        assert_eq!(outbound_body(&RawBody::from("")), "{}");
        assert_eq!(outbound_body(&RawBody::from("  \r\n ")), "{}");
    }

    #[test]
    fn content_type_defaults_to_json() {
        assert_eq!(relayed_content_type(&HeaderMap::new()), DEFAULT_CONTENT_TYPE);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        assert_eq!(relayed_content_type(&headers), "text/html");
    }
}
