//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the single proxy handler
//! - Wire up middleware (tracing)
//! - Bind server to listener
//! - Resolve the target, build the outbound request, relay the response
//!
//! # Design Decisions
//! - No request timeout anywhere: streamed responses may run indefinitely
//! - Redirects are relayed to the caller, never followed
//! - No cross-request state besides the immutable config and the cached public IP

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::error::ProxyError;
use crate::http::request::{build_outbound, check_request_target};
use crate::http::response::relay_response;
use crate::net::PublicIp;
use crate::routing::resolve_target;

/// Error type for server setup.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub client: reqwest::Client,
    pub public_ip: Arc<PublicIp>,
}

/// HTTP server for the relay proxy.
pub struct HttpServer {
    router: Router,
    config: Arc<ProxyConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let config = Arc::new(config);

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let state = AppState {
            public_ip: Arc::new(PublicIp::new(&config.upstream)?),
            config: config.clone(),
            client,
        };

        Ok(Self {
            router: Self::build_router(state),
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            // `*` and authority-form request-targets match no path route.
            .fallback(proxy_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Router with state attached, for driving the handler without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` completes.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            target_url = %self.config.upstream.target_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Resolves the upstream, forwards the request, and streams the response back.
async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    check_request_target(&parts.uri)?;

    let target = resolve_target(&parts.uri, &parts.headers, &state.config.upstream);
    if state.config.upstream.local_debug {
        tracing::info!(method = %parts.method, target_url = %target.url(), "Proxying request");
    } else {
        tracing::debug!(method = %parts.method, target_url = %target.url(), "Proxying request");
    }

    let forwarded_ip = state.public_ip.current().await;
    let outbound = build_outbound(
        parts.method,
        &parts.headers,
        body,
        &target,
        forwarded_ip.as_deref(),
    )?;

    let upstream = state.client.execute(outbound).await?;
    Ok(relay_response(upstream))
}
