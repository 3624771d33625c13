//! Streaming HTTP reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ routing (target + path) ──▶ http::request
//!                                                                      │
//!                                                    net::public_ip ───┤ X-Forwarded-For
//!                                                                      ▼
//!     Client Response                                              reqwest ──────▶ Upstream
//!     ◀────────────── http::response (chunked relay) ◀─────────────────┘
//! ```

use clap::Parser;
use tokio::net::TcpListener;

use relay_proxy::config::{load_config, CliArgs};
use relay_proxy::lifecycle::{shutdown_signal, Shutdown, DRAIN_TIMEOUT};
use relay_proxy::observability::logging;
use relay_proxy::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliArgs::parse();
    let config = load_config(&cli, |key| std::env::var(key).ok())?;

    logging::init(&config.observability);

    tracing::info!("relay-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        target_url = %config.upstream.target_url,
        port = config.listener.port,
        local_debug = config.upstream.local_debug,
        static_proxy_ip = config.upstream.proxy_server_ip.is_some(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let mut serving = tokio::spawn(server.run(listener, shutdown.signalled()));

    tokio::select! {
        result = &mut serving => return Ok(result??),
        _ = shutdown_signal() => shutdown.trigger(),
    }

    match tokio::time::timeout(DRAIN_TIMEOUT, serving).await {
        Ok(result) => result??,
        Err(_) => tracing::warn!(
            timeout_secs = DRAIN_TIMEOUT.as_secs(),
            "In-flight requests still open, exiting without waiting"
        ),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
