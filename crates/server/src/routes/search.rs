use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use faqline::{FaqMatch, Stage, StageTimings};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// FAQ search request
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Natural-language query from the voice-agent front end
    pub query: String,
}

/// FAQ search response
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Matches ordered by descending score
    pub matches: Vec<FaqMatch>,
    /// Advisory latency breakdown for this request
    pub timing: TimingSummary,
}

/// Per-stage latency summary
#[derive(Debug, Serialize)]
pub struct TimingSummary {
    pub embedding_ms: f64,
    pub search_ms: f64,
    pub total_ms: f64,
    pub embedding_percent: f64,
    pub search_percent: f64,
}

impl From<&StageTimings> for TimingSummary {
    fn from(timings: &StageTimings) -> Self {
        Self {
            embedding_ms: timings.embedding.as_secs_f64() * 1000.0,
            search_ms: timings.search.as_secs_f64() * 1000.0,
            total_ms: timings.total().as_secs_f64() * 1000.0,
            embedding_percent: timings.percent(Stage::Embedding),
            search_percent: timings.percent(Stage::Search),
        }
    }
}

/// Retrieve the FAQ entries most relevant to the query
///
/// POST /api/v1/search
///
/// Zero matches is a successful empty response. Stage failures surface the
/// failing stage in the error body so an embedding outage can be told from
/// a search outage without parsing messages.
pub async fn search_faqs(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SearchRequest>,
) -> ServerResult<impl IntoResponse> {
    if request.query.trim().is_empty() {
        return Err(ServerError::BadRequest("query must not be empty".into()));
    }

    metrics::counter!("faqline_search_requests_total").increment(1);

    let outcome = state
        .retriever
        .search_with_timings(&request.query)
        .await
        .map_err(|err| {
            tracing::warn!(stage = err.stage(), error = %err, "search request failed");
            metrics::counter!("faqline_search_failures_total", "stage" => err.stage())
                .increment(1);
            ServerError::from(err)
        })?;

    Ok(Json(SearchResponse {
        timing: TimingSummary::from(&outcome.timings),
        matches: outcome.matches,
    }))
}
