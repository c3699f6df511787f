//! Sandbox API reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 SANDBOX PROXY                │
//!   Client Request        │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!   ──────────────────────┼─▶│ trace +  │──▶│ raw body │──▶│  route   │  │
//!                         │  │ req id   │   │ capture  │   │ handler  │  │
//!                         │  └──────────┘   └──────────┘   └────┬─────┘  │
//!                         │                                     │        │
//!                         │        ┌────────────────┬───────────┼─────┐  │
//!                         │        ▼                ▼           ▼     │  │
//!                         │   ┌─────────┐     ┌──────────┐ ┌────────┐ │  │
//!   Client Response       │   │ forward │     │ download │ │ image  │ │  │
//!   ◀─────────────────────┼───│ (bearer)│     │ (stream) │ │ (fs)   │ │  │
//!                         │   └────┬────┘     └────┬─────┘ └────────┘ │  │
//!                         └────────┼───────────────┼──────────────────┘  │
//!                                  ▼               ▼
//!                           sandbox API      any http(s) URL
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use sandbox_proxy::config::loader;
use sandbox_proxy::lifecycle::signals::spawn_signal_listener;
use sandbox_proxy::observability::{logging, metrics};
use sandbox_proxy::{BearerCredential, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "sandbox-proxy", version)]
#[command(about = "Reverse proxy for the sandbox video API", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening port. Overrides the config file and PORT.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; real deployments use the environment.
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let mut config = loader::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.listener.set_port(port);
    }

    logging::init_logging(&config.observability);
    tracing::info!("sandbox-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    let credential = match BearerCredential::from_env() {
        Ok(credential) => credential,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start without upstream credential");
            return Err(e.into());
        }
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Proxy listening");

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config, credential)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
