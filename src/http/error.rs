//! Request-scoped proxy failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Everything that can go wrong while proxying one request.
///
/// Every variant is local to its request: nothing is retried and nothing
/// brings the process down.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The inbound request-target cannot be forwarded (e.g. `*` or authority-form).
    #[error("malformed request URL: {0}")]
    MalformedRequestUrl(String),

    /// The outbound request could not be assembled.
    #[error("cannot build request for '{url}': {reason}")]
    Construction { url: String, reason: String },

    /// The upstream could not be reached or failed before sending a response.
    #[error(transparent)]
    Dispatch(#[from] reqwest::Error),

    /// The upstream body failed after the status line was already sent.
    #[error("error while reading upstream body: {0}")]
    StreamRead(String),
}

/// Render an error and every `source()` beneath it, joined with `": "`.
///
/// Transport errors keep the useful part (e.g. "Connection refused") in their
/// sources; the top-level message alone only names the failed URL. A level
/// whose text already appears in the output is skipped.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = match &self {
            ProxyError::MalformedRequestUrl(uri) => {
                tracing::error!(uri = %uri, "Error parsing URL");
                StatusCode::INTERNAL_SERVER_ERROR
                    .canonical_reason()
                    .unwrap_or_default()
                    .to_string()
            }
            ProxyError::Construction { url, reason } => {
                tracing::error!(url = %url, reason = %reason, "Error creating proxy request");
                "Error creating proxy request".to_string()
            }
            ProxyError::Dispatch(e) => {
                let message = error_chain(e);
                tracing::error!(error = %message, "Error sending proxy request");
                message
            }
            ProxyError::StreamRead(e) => {
                tracing::error!(error = %e, "Error reading upstream body");
                self.to_string()
            }
        };

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
