//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID, CORS, body capture, timeout)
//! - Build the shared upstream client
//! - Bind server to listener and drain on shutdown

use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{BearerCredential, ConfigError, CorsConfig, ProxyConfig};
use crate::http::forward::{self, Forwarder};
use crate::http::request::{capture_raw_body, CaptureSettings, MakeRequestUuid};
use crate::http::{download, image};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::routing::SandboxEndpoint;
use crate::security::{HostPolicy, ImageRoot};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    pub client: reqwest::Client,
    pub host_policy: Arc<HostPolicy>,
    pub image_root: Arc<ImageRoot>,
    pub upstream_timeout: Duration,
}

impl AppState {
    /// Build handler dependencies from config and the server credential.
    pub fn new(config: &ProxyConfig, credential: BearerCredential) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()?;
        let upstream_timeout = Duration::from_secs(config.timeouts.upstream_secs);

        let forwarder = Forwarder::new(
            client.clone(),
            config.upstream.base_url.clone(),
            credential,
            upstream_timeout,
        );

        let host_policy = HostPolicy::new(&config.download);
        if host_policy.is_permissive() {
            tracing::warn!("download.allowed_hosts is empty; the download route may fetch any host");
        }

        let image_root = ImageRoot::new(&config.images)?;
        if image_root.is_unrestricted() {
            tracing::warn!("images.root is unset; the image route may read any file with an image extension");
        }

        Ok(Self {
            forwarder: Arc::new(forwarder),
            client,
            host_policy: Arc::new(host_policy),
            image_root: Arc::new(image_root),
            upstream_timeout,
        })
    }
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig, credential: BearerCredential) -> Result<Self, ConfigError> {
        let state = AppState::new(&config, credential)?;
        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let mut router = Router::new();
        for endpoint in SandboxEndpoint::ALL {
            router = router.route(endpoint.local_path(), forward::route(endpoint));
        }

        router
            .route("/api/proxy/download", post(download::download))
            .route("/image", get(image::serve_image))
            .route("/health", get(get_status))
            .route_layer(middleware::from_fn(metrics::track_requests))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(cors_layer(&config.cors))
            .layer(middleware::from_fn_with_state(
                CaptureSettings::from_config(config),
                capture_raw_body,
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// CORS policy: any origin, POST/OPTIONS, no credentials.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(false)
        .max_age(Duration::from_secs(config.max_age_secs))
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}
