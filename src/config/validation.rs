//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the upstream URL (scheme, host)
//! - Validate value ranges (port, timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: &ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("target_url '{url}' is not a valid URL: {reason}")]
    InvalidTargetUrl { url: String, reason: String },

    #[error("target_url '{0}' must use http or https")]
    UnsupportedScheme(String),

    #[error("target_url '{0}' has no host")]
    MissingHost(String),

    #[error("listener port must be non-zero")]
    ZeroPort,

    #[error("ip_lookup_timeout_secs must be non-zero")]
    ZeroLookupTimeout,
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let target = &config.upstream.target_url;
    match Url::parse(target) {
        Ok(url) => {
            if !matches!(url.scheme(), "http" | "https") {
                errors.push(ValidationError::UnsupportedScheme(target.clone()));
            }
            if url.host_str().is_none() {
                errors.push(ValidationError::MissingHost(target.clone()));
            }
        }
        Err(e) => errors.push(ValidationError::InvalidTargetUrl {
            url: target.clone(),
            reason: e.to_string(),
        }),
    }

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if config.upstream.ip_lookup_timeout_secs == 0 {
        errors.push(ValidationError::ZeroLookupTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.upstream.target_url = "ftp://files.example.com".into();
        config.listener.port = 0;
        config.upstream.ip_lookup_timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::UnsupportedScheme("ftp://files.example.com".into()),
                ValidationError::ZeroPort,
                ValidationError::ZeroLookupTimeout,
            ]
        );
    }

    #[test]
    fn test_rejects_unparsable_target() {
        let mut config = ProxyConfig::default();
        config.upstream.target_url = "api.openai.com".into();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidTargetUrl { .. }));
    }
}
