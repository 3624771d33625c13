//! Network identity subsystem.
//!
//! # Data Flow
//! ```text
//! PROXY_SERVER_IP set?
//!     yes → use it
//!     no  → public_ip.rs (one bounded HTTP lookup, cached on success)
//!     → Option<String> handed to the request builder
//! ```

pub mod public_ip;

pub use public_ip::PublicIp;
