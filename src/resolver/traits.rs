// Resolver client trait and shared HTTP plumbing

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::errors::ResolveError;
use super::models::{Backend, ResolverConfig};

/// Trait for upstream resolver clients.
///
/// A client turns a target URL into the raw JSON payload of its
/// service. Payload shaping is the normalizer's job, never the
/// client's.
#[async_trait]
pub trait ResolverClient: Send + Sync {
    /// Name of the client (for logging)
    fn name(&self) -> &'static str;

    /// Tag the normalizer uses to pick the payload mapping
    fn backend(&self) -> Backend;

    /// Fetch the raw payload for `url`
    async fn fetch(&self, url: &str) -> Result<Value, ResolveError>;
}

/// Build the HTTP client both resolver clients share
pub(crate) fn http_client(config: &ResolverConfig) -> reqwest::Client {
    let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
    if let Some(seconds) = config.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(seconds));
    }
    builder
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
