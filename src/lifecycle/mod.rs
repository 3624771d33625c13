//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging → Bind listener → Serve
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting → in-flight requests drain
//!     → process exits once drained or after DRAIN_TIMEOUT
//! ```
//!
//! # Design Decisions
//! - Draining is bounded: in-flight streams may never end on their own

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, DRAIN_TIMEOUT};
pub use signals::shutdown_signal;
