use crate::config::ServerConfig;
use faqline::{RetrievalMetrics, Retriever, Stage};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Retrieval orchestrator (shares the pooled clients)
    pub retriever: Retriever,

    /// Rendered by the /metrics endpoint when metrics are enabled
    pub metrics_handle: Option<PrometheusHandle>,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        retriever: Retriever,
        metrics_handle: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            retriever,
            metrics_handle,
        }
    }
}

/// Publishes per-stage retrieval latencies to the metrics recorder.
pub struct PrometheusStageMetrics;

impl RetrievalMetrics for PrometheusStageMetrics {
    fn record_stage(&self, stage: Stage, latency: Duration, ok: bool) {
        metrics::histogram!("faqline_stage_duration_seconds", "stage" => stage.as_str())
            .record(latency.as_secs_f64());
        if !ok {
            metrics::counter!("faqline_stage_failures_total", "stage" => stage.as_str())
                .increment(1);
        }
    }
}

/// Server metadata for health checks
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub version: String,
    pub uptime_seconds: u64,
}
