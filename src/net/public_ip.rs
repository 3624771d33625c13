//! Public IP resolution for outbound tagging.
//!
//! # Responsibilities
//! - Report the proxy's own public IP so it can be sent as `X-Forwarded-For`
//! - Prefer the statically configured address over any lookup
//! - Query an external lookup service at most once per successful resolution
//!
//! # Design Decisions
//! - Single-flight: every caller that arrives while a lookup is running awaits
//!   that same lookup and gets its result, success or failure
//! - Only success is cached; after a failure the next request starts a fresh lookup
//! - Lookup is bounded by its own timeout; failure never fails the request

use std::sync::OnceLock;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

use crate::config::UpstreamConfig;

/// Error from a single public IP lookup.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("IP lookup request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("IP lookup returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("IP lookup returned an empty body")]
    Empty,
}

type PendingLookup = Shared<BoxFuture<'static, Option<String>>>;

/// Resolves and caches this proxy's public IP.
pub struct PublicIp {
    fixed: Option<String>,
    lookup_url: String,
    client: reqwest::Client,
    resolved: OnceLock<String>,
    in_flight: Mutex<Option<PendingLookup>>,
}

impl PublicIp {
    /// Build a resolver from the upstream configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.ip_lookup_timeout_secs))
            .build()?;

        Ok(Self {
            fixed: config.proxy_server_ip.clone(),
            lookup_url: config.ip_lookup_url.clone(),
            client,
            resolved: OnceLock::new(),
            in_flight: Mutex::new(None),
        })
    }

    /// Current public IP, or `None` when it cannot be determined.
    pub async fn current(&self) -> Option<String> {
        if let Some(ip) = &self.fixed {
            return Some(ip.clone());
        }
        if let Some(ip) = self.resolved.get() {
            return Some(ip.clone());
        }

        let pending = {
            let mut slot = self.in_flight.lock().await;
            if let Some(ip) = self.resolved.get() {
                return Some(ip.clone());
            }
            match slot.as_ref() {
                Some(pending) => pending.clone(),
                None => {
                    let pending = lookup(self.client.clone(), self.lookup_url.clone())
                        .boxed()
                        .shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        let result = pending.clone().await;

        let mut slot = self.in_flight.lock().await;
        if let Some(ip) = &result {
            let _ = self.resolved.set(ip.clone());
        }
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&pending)) {
            *slot = None;
        }
        result
    }
}

/// One lookup attempt. Failures are logged here so a shared attempt logs once.
async fn lookup(client: reqwest::Client, lookup_url: String) -> Option<String> {
    match fetch(&client, &lookup_url).await {
        Ok(ip) => {
            tracing::info!(ip = %ip, "Resolved public IP");
            Some(ip)
        }
        Err(e) => {
            tracing::warn!(
                lookup_url = %lookup_url,
                error = %e,
                "Failed to resolve public IP, forwarding without X-Forwarded-For"
            );
            None
        }
    }
}

async fn fetch(client: &reqwest::Client, lookup_url: &str) -> Result<String, LookupError> {
    let response = client.get(lookup_url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Status(status));
    }

    let ip = response.text().await?.trim().to_string();
    if ip.is_empty() {
        return Err(LookupError::Empty);
    }
    Ok(ip)
}
