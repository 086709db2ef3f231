//! faqline server - HTTP API for low-latency FAQ retrieval
//!
//! Exposes the retrieval pipeline to the voice-agent front end:
//!
//! - **Search**: `POST /api/v1/search` — query text in, ordered
//!   `{question, answer, score}` matches out, with an advisory per-stage
//!   latency breakdown in every successful response
//! - **Health & Metrics**: liveness/readiness probes and Prometheus
//!   metrics (request counters, per-stage latency histograms)
//!
//! Stage failures keep their attribution all the way to the wire: the
//! error body names the failing stage and a stable error code, so an
//! embedding-engine outage is distinguishable from a vector-store outage
//! without parsing messages.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::start_server;
pub use state::ServerState;
