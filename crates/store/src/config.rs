use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::StoreError;

/// Connection and pool policy for the FAQ vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Connection string for the document store.
    #[serde(default)]
    pub uri: String,
    /// Database holding the FAQ corpus.
    #[serde(default = "default_database")]
    pub database: String,
    /// Collection of FAQ documents.
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Name of the vector search index over the embedding field.
    #[serde(default = "default_index")]
    pub index: String,
    /// Index dimensionality; query vectors are checked against it.
    #[serde(default = "default_dimension")]
    pub dimension: usize,
    /// Pool ceiling per server.
    #[serde(default = "default_max_pool_size")]
    pub max_pool_size: u32,
    /// Connections kept warm to avoid cold-start latency on bursts.
    #[serde(default = "default_min_pool_size")]
    pub min_pool_size: u32,
    /// Idle connections older than this are closed and evicted.
    #[serde(default = "default_idle_secs")]
    pub idle_secs: u64,
    /// Socket dial timeout.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// How long the driver may look for a usable server before the query
    /// fails with [`StoreError::ConnectTimeout`].
    #[serde(default = "default_selection_timeout_ms")]
    pub selection_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            database: default_database(),
            collection: default_collection(),
            index: default_index(),
            dimension: default_dimension(),
            max_pool_size: default_max_pool_size(),
            min_pool_size: default_min_pool_size(),
            idle_secs: default_idle_secs(),
            connect_timeout_ms: default_connect_timeout_ms(),
            selection_timeout_ms: default_selection_timeout_ms(),
        }
    }
}

impl StoreConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn selection_timeout(&self) -> Duration {
        Duration::from_millis(self.selection_timeout_ms)
    }

    /// Startup checks; violations are configuration errors, not per-query
    /// errors.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.uri.trim().is_empty() {
            return Err(StoreError::InvalidConfig("uri is empty".into()));
        }
        if self.database.trim().is_empty() {
            return Err(StoreError::InvalidConfig("database is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(StoreError::InvalidConfig("collection is empty".into()));
        }
        if self.index.trim().is_empty() {
            return Err(StoreError::InvalidConfig("index is empty".into()));
        }
        if self.dimension == 0 {
            return Err(StoreError::InvalidConfig("dimension must be positive".into()));
        }
        if self.max_pool_size == 0 {
            return Err(StoreError::InvalidConfig(
                "max_pool_size must be positive".into(),
            ));
        }
        if self.min_pool_size > self.max_pool_size {
            return Err(StoreError::InvalidConfig(format!(
                "min_pool_size ({}) exceeds max_pool_size ({})",
                self.min_pool_size, self.max_pool_size
            )));
        }
        Ok(())
    }
}

fn default_database() -> String {
    "knowledge_base".to_string()
}

fn default_collection() -> String {
    "faqs".to_string()
}

fn default_index() -> String {
    "faq_vector_index".to_string()
}

fn default_dimension() -> usize {
    1536
}

fn default_max_pool_size() -> u32 {
    10
}

fn default_min_pool_size() -> u32 {
    5
}

fn default_idle_secs() -> u64 {
    60
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_selection_timeout_ms() -> u64 {
    5_000
}
