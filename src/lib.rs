//! Low-latency FAQ retrieval for a voice-agent front end.
//!
//! One request flows through two strictly sequenced stages:
//!
//! ```text
//! query text ──▶ Embedding (remote inference) ──▶ Searching (vector index) ──▶ matches
//! ```
//!
//! The search stage's input is the embedding stage's output, so the first
//! failure aborts the request; the surfaced error carries which stage
//! failed ([`RetrievalError`]) so an embedding outage is never confused
//! with a search outage. Each stage is bracketed by wall-clock timing
//! ([`timing`]) that is recorded on success and failure alike but never
//! influences results.
//!
//! Clients are process-scoped: [`RetrievalContext::connect`] validates
//! configuration and builds the pooled clients once at startup,
//! [`RetrievalContext::retriever`] hands cheap orchestrator handles to
//! request handlers, and [`RetrievalContext::shutdown`] closes the pools
//! on exit. The core performs no retries; transient errors are marked as
//! such and retry/backoff stays a caller policy.

pub mod config;
pub mod timing;

pub use config::{ConfigError, RetrievalConfig, SearchSettings};
pub use embed::{EmbedClient, EmbedConfig, EmbedError};
pub use store::{FaqMatch, FaqStore, StoreConfig, StoreError};
pub use timing::{RetrievalMetrics, Stage, StageShare, StageTimings};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use timing::StageSpan;

/// Errors from one retrieval request, tagged with the failing stage.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The embedding stage failed; the search stage was never entered.
    #[error("embedding stage failed: {0}")]
    Embedding(#[from] EmbedError),

    /// The search stage failed after a successful embedding.
    #[error("search stage failed: {0}")]
    Search(#[from] StoreError),

    /// Startup configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RetrievalError {
    /// Name of the stage (or phase) that produced the error.
    pub fn stage(&self) -> &'static str {
        match self {
            RetrievalError::Embedding(_) => "embedding",
            RetrievalError::Search(_) => "search",
            RetrievalError::Config(_) => "config",
        }
    }

    /// Whether a caller-side retry with backoff can plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            RetrievalError::Embedding(err) => err.is_transient(),
            RetrievalError::Search(err) => err.is_transient(),
            RetrievalError::Config(_) => false,
        }
    }
}

/// Text-to-vector stage seam.
#[async_trait]
pub trait QueryEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

#[async_trait]
impl QueryEmbedder for EmbedClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        EmbedClient::embed(self, text).await
    }
}

/// Top-k similarity stage seam.
#[async_trait]
pub trait FaqIndex: Send + Sync {
    async fn top_k(
        &self,
        vector: &[f32],
        limit: u32,
        num_candidates: u32,
    ) -> Result<Vec<FaqMatch>, StoreError>;
}

#[async_trait]
impl FaqIndex for FaqStore {
    async fn top_k(
        &self,
        vector: &[f32],
        limit: u32,
        num_candidates: u32,
    ) -> Result<Vec<FaqMatch>, StoreError> {
        FaqStore::top_k(self, vector, limit, num_candidates).await
    }
}

/// Result of one retrieval, with the advisory latency breakdown.
#[derive(Debug, Clone)]
pub struct RetrievalOutcome {
    /// Matches ordered by descending score, at most `limit` entries.
    pub matches: Vec<FaqMatch>,
    /// Per-stage wall-clock accounting.
    pub timings: StageTimings,
}

/// The retrieval orchestrator: Embedding → Searching, nothing else.
///
/// Holds shared handles to the stage clients; cloning the handles is cheap,
/// so one `Retriever` per request handler is fine. Concurrent requests are
/// independent — the connection pools inside the clients are the only
/// shared state.
pub struct Retriever {
    embedder: Arc<dyn QueryEmbedder>,
    index: Arc<dyn FaqIndex>,
    search: SearchSettings,
    metrics: Option<Arc<dyn RetrievalMetrics>>,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn QueryEmbedder>,
        index: Arc<dyn FaqIndex>,
        search: SearchSettings,
    ) -> Self {
        Self {
            embedder,
            index,
            search,
            metrics: None,
        }
    }

    /// Attach a latency observer. Observability only; the observer cannot
    /// influence results or errors.
    pub fn with_metrics(mut self, metrics: Arc<dyn RetrievalMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Retrieve the FAQ entries most relevant to `query`.
    ///
    /// Zero matches is a successful empty result. Cancellation (dropping
    /// the future) propagates to whichever stage call is outstanding and
    /// releases its pooled resources.
    pub async fn search(&self, query: &str) -> Result<Vec<FaqMatch>, RetrievalError> {
        self.search_with_timings(query)
            .await
            .map(|outcome| outcome.matches)
    }

    /// Like [`search`](Self::search), also returning the stage timings.
    pub async fn search_with_timings(
        &self,
        query: &str,
    ) -> Result<RetrievalOutcome, RetrievalError> {
        let metrics = self.metrics.as_deref();

        let span = StageSpan::start(Stage::Embedding);
        let embedded = self.embedder.embed(query).await;
        let embedding_elapsed = span.finish(metrics, embedded.is_ok());
        let vector = embedded.map_err(RetrievalError::Embedding)?;

        let span = StageSpan::start(Stage::Search);
        let searched = self
            .index
            .top_k(&vector, self.search.limit, self.search.num_candidates)
            .await;
        let search_elapsed = span.finish(metrics, searched.is_ok());
        let matches = searched.map_err(RetrievalError::Search)?;

        let timings = StageTimings {
            embedding: embedding_elapsed,
            search: search_elapsed,
        };
        tracing::debug!(
            matches = matches.len(),
            total_ms = timings.total().as_secs_f64() * 1000.0,
            embedding_percent = timings.percent(Stage::Embedding),
            search_percent = timings.percent(Stage::Search),
            "retrieval complete"
        );

        Ok(RetrievalOutcome { matches, timings })
    }
}

/// Process-scoped clients with explicit lifecycle.
///
/// Construct once at startup, hand [`retriever`](Self::retriever) handles
/// to request handlers, and call [`shutdown`](Self::shutdown) on exit to
/// close the pooled store connections. Replaces ambient module-level
/// clients with an injected context.
pub struct RetrievalContext {
    embedder: Arc<EmbedClient>,
    store: Arc<FaqStore>,
    search: SearchSettings,
}

impl RetrievalContext {
    /// Validate `cfg` and construct both clients. Fails fast on
    /// configuration errors; no similarity query is issued yet.
    pub async fn connect(cfg: &RetrievalConfig) -> Result<Self, RetrievalError> {
        cfg.validate()?;
        let embedder = Arc::new(EmbedClient::new(&cfg.embedding)?);
        let store = Arc::new(FaqStore::connect(&cfg.store).await?);
        Ok(Self {
            embedder,
            store,
            search: cfg.search,
        })
    }

    /// Build an orchestrator over the shared clients.
    pub fn retriever(&self) -> Retriever {
        Retriever::new(self.embedder.clone(), self.store.clone(), self.search)
    }

    /// Tear down, closing every pooled store connection. Outstanding
    /// retriever handles will fail their next query.
    pub async fn shutdown(&self) {
        self.store.close().await;
        tracing::info!("retrieval context shut down");
    }
}
