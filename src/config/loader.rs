//! Configuration loading from disk, environment and command line.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the default upstream base URL.
pub const ENV_TARGET_URL: &str = "TARGET_URL";
/// Environment variable selecting the deployment environment (`local` enables debug output).
pub const ENV_STAGE: &str = "ENV";
/// Environment variable holding a static public IP for this proxy.
pub const ENV_PROXY_SERVER_IP: &str = "PROXY_SERVER_IP";
/// Environment variable overriding the public IP lookup service.
pub const ENV_IP_LOOKUP_URL: &str = "IP_LOOKUP_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Command-line flags.
#[derive(Debug, Default, Parser)]
#[command(name = "relay-proxy")]
#[command(about = "Streaming HTTP reverse proxy for a single upstream", long_about = None)]
pub struct CliArgs {
    /// The proxy port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Optional TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set.
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Read a TOML configuration file without validating it.
pub fn read_config_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Assemble the process configuration.
///
/// Precedence, lowest first: defaults, config file, environment, flags.
/// `env` is the environment lookup; variables set to an empty string count as unset.
pub fn load_config<F>(cli: &CliArgs, env: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config {
        Some(path) => read_config_file(path)?,
        None => ProxyConfig::default(),
    };

    let lookup = |key: &str| env(key).filter(|v| !v.is_empty());

    if let Some(target) = lookup(ENV_TARGET_URL) {
        config.upstream.target_url = target;
    }
    if let Some(stage) = lookup(ENV_STAGE) {
        config.upstream.local_debug = stage == "local";
    }
    if let Some(ip) = lookup(ENV_PROXY_SERVER_IP) {
        config.upstream.proxy_server_ip = Some(ip);
    }
    if let Some(url) = lookup(ENV_IP_LOOKUP_URL) {
        config.upstream.ip_lookup_url = url;
    }

    if let Some(port) = cli.port {
        config.listener.port = port;
    }
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    if let Some(trimmed) = config.upstream.target_url.strip_suffix('/') {
        config.upstream.target_url = trimmed.to_string();
    }
    config.upstream.proxy_server_ip = config
        .upstream
        .proxy_server_ip
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty());

    Ok(config)
}
