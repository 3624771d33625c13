//! Streaming HTTP reverse proxy for a single upstream.
//!
//! Every inbound request is forwarded to the configured upstream (or the
//! host named in `X-Target-Host`), with `/release` and `/test` stage
//! segments stripped from the path. Responses are relayed as they arrive,
//! so long-lived streamed output reaches the caller incrementally.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
