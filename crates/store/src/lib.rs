//! Similarity search client for the faqline retrieval pipeline.
//!
//! Issues top-k queries against the FAQ corpus's database-side vector
//! index (`$vectorSearch`, dot-product similarity) and shapes the result
//! down to `{question, answer, score}`. This path is strictly read-only;
//! corpus ingestion and index maintenance belong to the offline batch job.
//!
//! Connection pooling is delegated to the driver and configured through
//! [`StoreConfig`]: a warm minimum, a hard ceiling, idle eviction, and
//! bounded connect/server-selection timeouts.

mod client;
mod config;
mod error;
mod types;

pub use client::{FaqStore, VECTOR_PATH};
pub use config::StoreConfig;
pub use error::StoreError;
pub use types::FaqMatch;
