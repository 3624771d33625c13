//! Outbound request construction.
//!
//! # Responsibilities
//! - Reject request-targets that cannot be forwarded
//! - Copy method, headers (all values per key) and body onto the outbound request
//! - Tag the request with the proxy's public IP
//!
//! # Design Decisions
//! - Body is streamed through once, never buffered
//! - `Host` and `Transfer-Encoding` are left to the client: they describe the
//!   inbound connection, not the request
//! - `X-Forwarded-For` is replaced, not appended, when the proxy IP is known

use axum::body::{Body, HttpBody};
use axum::http::{header, HeaderMap, HeaderValue, Method, Uri};
use reqwest::Url;

use crate::http::error::ProxyError;
use crate::routing::OutboundTarget;

/// Header carrying the proxy's public IP.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Ensure the inbound request-target has a path we can forward.
pub fn check_request_target(uri: &Uri) -> Result<(), ProxyError> {
    if uri.path().starts_with('/') {
        Ok(())
    } else {
        Err(ProxyError::MalformedRequestUrl(uri.to_string()))
    }
}

/// Copy inbound headers, preserving every value of every key.
pub fn forward_headers(inbound: &HeaderMap, forwarded_ip: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len() + 1);
    for (name, value) in inbound {
        if name == header::HOST || name == header::TRANSFER_ENCODING {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if let Some(ip) = forwarded_ip {
        match HeaderValue::from_str(ip) {
            Ok(value) => {
                headers.insert(X_FORWARDED_FOR, value);
            }
            Err(_) => tracing::warn!(ip = %ip, "Public IP is not a valid header value, skipping"),
        }
    }

    headers
}

/// Assemble the outbound request for `target`.
pub fn build_outbound(
    method: Method,
    inbound_headers: &HeaderMap,
    body: Body,
    target: &OutboundTarget,
    forwarded_ip: Option<&str>,
) -> Result<reqwest::Request, ProxyError> {
    let url = target.url();
    let parsed = Url::parse(&url).map_err(|e| ProxyError::Construction {
        url: url.clone(),
        reason: e.to_string(),
    })?;

    let mut request = reqwest::Request::new(method, parsed);
    *request.headers_mut() = forward_headers(inbound_headers, forwarded_ip);

    if body.size_hint().exact() != Some(0) {
        *request.body_mut() = Some(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    Ok(request)
}
