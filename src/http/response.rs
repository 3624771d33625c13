//! Streaming response relay.
//!
//! # Responsibilities
//! - Copy upstream status and headers (every value per key) to the caller
//! - Relay the upstream body chunk by chunk as it arrives
//! - Turn a mid-stream upstream failure into a logged, truncated response
//!
//! # Design Decisions
//! - Status and headers are fixed before the first body byte is polled
//! - No buffering: each chunk (at most `RELAY_CHUNK_SIZE` bytes) becomes its
//!   own body frame, which hyper writes and flushes as soon as it is produced
//! - Hop-by-hop headers are dropped; hyper regenerates connection framing
//! - If the caller disconnects, hyper drops the body stream, which drops the
//!   upstream response and closes that connection too

use std::convert::Infallible;
use std::fmt::Display;
use std::pin::Pin;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName};
use axum::response::Response;
use futures_util::stream::{self, Stream, StreamExt};

use crate::http::error::ProxyError;

/// Upper bound on a single relayed body frame.
pub const RELAY_CHUNK_SIZE: usize = 1024;

fn is_hop_by_hop(name: &HeaderName) -> bool {
    name == header::CONNECTION || name == header::TRANSFER_ENCODING || name == "keep-alive"
}

struct RelayState<S> {
    upstream: Pin<Box<S>>,
    pending: Bytes,
    finished: bool,
}

/// Re-cut an upstream byte stream into frames of at most `RELAY_CHUNK_SIZE`.
///
/// A read error ends the stream: it is logged, and its description is sent
/// as a final best-effort frame. The caller has already received a status
/// line by then, so it observes a truncated body.
pub fn relay_chunks<S, E>(upstream: S) -> impl Stream<Item = Result<Bytes, Infallible>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display,
{
    let state = RelayState {
        upstream: Box::pin(upstream),
        pending: Bytes::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if !state.pending.is_empty() {
                let len = state.pending.len().min(RELAY_CHUNK_SIZE);
                let chunk = state.pending.split_to(len);
                return Some((Ok(chunk), state));
            }
            if state.finished {
                return None;
            }

            match state.upstream.next().await {
                Some(Ok(bytes)) => state.pending = bytes,
                Some(Err(e)) => {
                    let err = ProxyError::StreamRead(e.to_string());
                    tracing::error!(error = %err, "Upstream body failed mid-stream, truncating response");
                    state.pending = Bytes::from(format!("{}\n", e));
                    state.finished = true;
                }
                None => return None,
            }
        }
    })
}

/// Response headers to forward, minus hop-by-hop fields.
pub fn relay_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if is_hop_by_hop(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

/// Turn an upstream response into the caller's response without buffering it.
pub fn relay_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = relay_headers(upstream.headers());

    tracing::debug!(status = %status, "Relaying upstream response");

    let mut response = Response::new(Body::from_stream(relay_chunks(upstream.bytes_stream())));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
