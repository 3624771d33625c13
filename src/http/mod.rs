//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, single catch-all handler)
//!     → [routing layer resolves the outbound target]
//!     → request.rs (copy method, headers, body; tag X-Forwarded-For)
//!     → reqwest client (no timeout, no redirects)
//!     → response.rs (status + headers, then chunked body relay)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::ProxyError;
pub use server::{HttpServer, ServerError};
