//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits so they can be read from a TOML file; every
//! field has a default so an empty file (or no file at all) is valid.

use serde::{Deserialize, Serialize};

/// Default upstream used when `TARGET_URL` is unset.
pub const DEFAULT_TARGET_URL: &str = "https://api.openai.com";

/// Default public IP lookup service.
pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ipconfig.me";

/// Root configuration for the relay proxy.
///
/// Built once at startup and never mutated afterwards; handlers share it
/// through an `Arc`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind host, port).
    pub listener: ListenerConfig,

    /// Upstream target and outbound request settings.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// Port to listen on.
    pub port: u16,
}

impl ListenerConfig {
    /// Socket address string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 9000,
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Default upstream base URL (scheme + host, optional port).
    pub target_url: String,

    /// Log every resolved outbound URL at info level.
    pub local_debug: bool,

    /// Static public IP of this proxy. Skips the external lookup when set.
    pub proxy_server_ip: Option<String>,

    /// Service returning this host's public IP as plain text.
    pub ip_lookup_url: String,

    /// Upper bound on the public IP lookup, in seconds.
    pub ip_lookup_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            local_debug: false,
            proxy_server_ip: None,
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_string(),
            ip_lookup_timeout_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
