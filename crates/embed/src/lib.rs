//! Embedding client for the faqline retrieval pipeline.
//!
//! Converts query text into fixed-length dense vectors by calling a remote
//! inference deployment over HTTP. The crate owns the outbound resource
//! policy for that endpoint:
//!
//! - a pooled HTTP client (idle connections kept warm, evicted after an
//!   idle timeout, socket dials bounded by a connect timeout), and
//! - a [`ConnectionGate`] capping in-flight requests, so a burst degrades
//!   into bounded queueing instead of unbounded connection growth.
//!
//! The client performs no retries; transient failures are surfaced to the
//! caller, which owns the retry/backoff policy.

mod client;
mod config;
mod error;
mod gate;

pub use client::EmbedClient;
pub use config::EmbedConfig;
pub use error::EmbedError;
pub use gate::{ConnectionGate, GatePermit};

/// Default embedding dimensionality; must match the similarity index.
pub const DEFAULT_DIMENSION: usize = 1536;
