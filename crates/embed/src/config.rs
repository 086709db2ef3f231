use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::EmbedError;

/// Runtime configuration for the remote embedding engine.
///
/// The endpoint is addressed Azure-style: the request path is built from
/// the base endpoint, a deployment name, and an API version query
/// parameter. The API key travels in the `api-key` header on every call.
///
/// # Example
/// ```no_run
/// use embed::{EmbedClient, EmbedConfig};
///
/// let cfg = EmbedConfig {
///     endpoint: "https://example.openai.azure.com".into(),
///     deployment: "text-embedding-3-small".into(),
///     api_key: "sk-xxx".into(),
///     ..Default::default()
/// };
///
/// let client = EmbedClient::new(&cfg);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedConfig {
    /// Base URL of the inference endpoint (no trailing path).
    #[serde(default)]
    pub endpoint: String,
    /// Deployment (model) name addressed under the endpoint.
    #[serde(default = "default_deployment")]
    pub deployment: String,
    /// Static API key sent in the `api-key` header.
    #[serde(default)]
    pub api_key: String,
    /// API version query parameter.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Expected vector length; must match the similarity index dimensionality.
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// Per-request timeout, distinct from the connect/acquire timeouts.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Socket dial timeout.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// How long a request may wait for an in-flight slot before failing
    /// with [`EmbedError::PoolExhausted`].
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
    /// Maximum concurrent requests to the engine.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
    /// Maximum idle connections kept warm by the HTTP pool.
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle: usize,
    /// Idle connections older than this are evicted from the pool.
    #[serde(default = "default_pool_idle_secs")]
    pub pool_idle_secs: u64,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            deployment: default_deployment(),
            api_key: String::new(),
            api_version: default_api_version(),
            dimension: default_dimension(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
            max_in_flight: default_max_in_flight(),
            pool_max_idle: default_pool_max_idle(),
            pool_idle_secs: default_pool_idle_secs(),
        }
    }
}

impl EmbedConfig {
    /// Full request URL for the embeddings call.
    pub fn request_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_secs)
    }

    /// Startup checks; a config that passes never fails per-request for
    /// configuration reasons.
    pub fn validate(&self) -> Result<(), EmbedError> {
        if self.endpoint.trim().is_empty() {
            return Err(EmbedError::InvalidConfig("endpoint is empty".into()));
        }
        if self.deployment.trim().is_empty() {
            return Err(EmbedError::InvalidConfig("deployment is empty".into()));
        }
        if self.api_key.trim().is_empty() {
            return Err(EmbedError::InvalidConfig("api_key is empty".into()));
        }
        if self.dimension == 0 {
            return Err(EmbedError::InvalidConfig("dimension must be positive".into()));
        }
        if self.max_in_flight == 0 {
            return Err(EmbedError::InvalidConfig(
                "max_in_flight must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn default_deployment() -> String {
    "text-embedding-3-small".to_string()
}

fn default_api_version() -> String {
    "2023-05-15".to_string()
}

fn default_dimension() -> usize {
    crate::DEFAULT_DIMENSION
}

fn default_request_timeout_ms() -> u64 {
    3_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_acquire_timeout_ms() -> u64 {
    5_000
}

fn default_max_in_flight() -> usize {
    10
}

fn default_pool_max_idle() -> usize {
    10
}

fn default_pool_idle_secs() -> u64 {
    60
}
