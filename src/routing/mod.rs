//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, query, headers)
//!     → target.rs (override header or default upstream)
//!     → path.rs (strip /release, then /test)
//!     → Return: OutboundTarget (origin + path + query)
//! ```
//!
//! # Design Decisions
//! - Single upstream per request, no route table
//! - Stateless: same input always yields the same target

pub mod path;
pub mod target;

pub use path::normalize_path;
pub use target::{resolve_target, OutboundTarget, X_TARGET_HOST};
