//! Staging-prefix stripping.
//!
//! An API gateway in front of the proxy inserts deployment-stage segments
//! (`/release`, `/test`) into the path. They are removed before forwarding.
//!
//! # Design Decisions
//! - Literal substring removal, first occurrence only, not anchored to the
//!   path start: `/foo/release-notes` loses its `/release` too. Existing
//!   deployments rely on this.
//! - Fixed order: `/release` first, then `/test`

/// Stage prefixes removed from inbound paths, in removal order.
pub const STAGE_PREFIXES: [&str; 2] = ["/release", "/test"];

/// Remove the first occurrence of each stage prefix from `path`.
pub fn normalize_path(path: &str) -> String {
    STAGE_PREFIXES
        .iter()
        .fold(path.to_string(), |acc, prefix| acc.replacen(prefix, "", 1))
}
