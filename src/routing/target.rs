//! Upstream target resolution.
//!
//! # Responsibilities
//! - Pick the upstream origin for a request (override header or default)
//! - Combine origin, normalized path and query into the outbound URL
//!
//! # Design Decisions
//! - `X-Target-Host` wins over the configured default whenever it is non-empty
//! - The override always uses `https`; its value is not validated here
//! - Resolution never fails; malformed results surface when the outbound
//!   request is built

use axum::http::{HeaderMap, Uri};

use crate::config::UpstreamConfig;
use crate::routing::path::normalize_path;

/// Per-request upstream override header.
pub const X_TARGET_HOST: &str = "x-target-host";

/// Where a single request is forwarded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundTarget {
    /// Scheme and host (optionally port), no trailing slash.
    pub origin: String,
    /// Path with stage prefixes already stripped.
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
}

impl OutboundTarget {
    /// Full outbound URL as a string.
    pub fn url(&self) -> String {
        match &self.query {
            Some(query) => format!("{}{}?{}", self.origin, self.path, query),
            None => format!("{}{}", self.origin, self.path),
        }
    }
}

/// Origin selected from the override header, if one is present and non-empty.
pub fn override_origin(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(X_TARGET_HOST)?;
    if value.is_empty() {
        return None;
    }
    Some(format!("https://{}", String::from_utf8_lossy(value.as_bytes())))
}

/// Resolve the outbound target for an inbound request.
pub fn resolve_target(uri: &Uri, headers: &HeaderMap, upstream: &UpstreamConfig) -> OutboundTarget {
    let origin = override_origin(headers).unwrap_or_else(|| upstream.target_url.clone());

    OutboundTarget {
        origin,
        path: normalize_path(uri.path()),
        query: uri.query().filter(|q| !q.is_empty()).map(str::to_string),
    }
}
