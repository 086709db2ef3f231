//! Runtime configuration for the retrieval pipeline.
//!
//! Environment-first: values come from `FAQLINE`-prefixed environment
//! variables with `__` separating nesting (e.g. `FAQLINE__EMBEDDING__API_KEY`,
//! `FAQLINE__STORE__URI`), optionally layered over a `faqline.toml` file.
//! Required values and cross-field invariants are checked once at startup;
//! a missing endpoint or an inconsistent candidate/limit pair refuses to
//! boot instead of failing per-request.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use embed::EmbedConfig;
use store::StoreConfig;

/// Errors produced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("missing required value: {0}")]
    Missing(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-k shaping for the similarity query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchSettings {
    /// Maximum number of matches returned to the caller.
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Approximate-nearest-neighbour candidates the index examines before
    /// truncating to `limit`. Must be >= `limit`.
    #[serde(default = "default_num_candidates")]
    pub num_candidates: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            num_candidates: default_num_candidates(),
        }
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RetrievalConfig {
    /// Embedding engine endpoint, credentials, and pool policy.
    #[serde(default)]
    pub embedding: EmbedConfig,

    /// Vector store connection and pool policy.
    #[serde(default)]
    pub store: StoreConfig,

    /// Result shaping.
    #[serde(default)]
    pub search: SearchSettings,
}

impl RetrievalConfig {
    /// Load from the environment and an optional `faqline` config file,
    /// then validate.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("faqline").required(false))
            .add_source(
                config::Environment::with_prefix("FAQLINE")
                    .separator("__")
                    .try_parsing(true),
            );

        let cfg: RetrievalConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Fail-fast startup checks. Nothing rejected here is recoverable at
    /// query time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding.endpoint.trim().is_empty() {
            return Err(ConfigError::Missing("embedding.endpoint"));
        }
        if self.embedding.deployment.trim().is_empty() {
            return Err(ConfigError::Missing("embedding.deployment"));
        }
        if self.embedding.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("embedding.api_key"));
        }
        if self.store.uri.trim().is_empty() {
            return Err(ConfigError::Missing("store.uri"));
        }
        if self.search.limit == 0 {
            return Err(ConfigError::Invalid("search.limit must be positive".into()));
        }
        if self.search.num_candidates < self.search.limit {
            return Err(ConfigError::Invalid(format!(
                "search.num_candidates ({}) must be >= search.limit ({})",
                self.search.num_candidates, self.search.limit
            )));
        }
        if self.embedding.dimension != self.store.dimension {
            return Err(ConfigError::Invalid(format!(
                "embedding dimension ({}) and store index dimension ({}) disagree",
                self.embedding.dimension, self.store.dimension
            )));
        }

        self.embedding
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.store
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }
}

fn default_limit() -> u32 {
    5
}

fn default_num_candidates() -> u32 {
    50
}
