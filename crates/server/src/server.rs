//! Server initialization and routing
//!
//! Axum server setup: router configuration, middleware stack, metrics
//! recorder installation, and graceful shutdown handling.

use crate::config::ServerConfig;
use crate::routes::{api_info, health, not_found, search};
use crate::state::{PrometheusStageMetrics, ServerState};
use axum::routing::{get, post};
use axum::Router;
use faqline::{RetrievalConfig, RetrievalContext};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// - Public routes: `/`, `/health`, `/ready`, `/metrics`
/// - API routes: `POST /api/v1/search`
fn build_router(state: Arc<ServerState>) -> Router {
    let cors = if state.config.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    let public_routes = Router::new()
        .route("/", get(api_info))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .route("/api/v1/metadata", get(health::server_metadata));

    let api_routes = Router::new().route("/api/v1/search", post(search::search_faqs));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .fallback(not_found)
        .layer(TimeoutLayer::new(state.config.timeout()))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the faqline HTTP server
///
/// Loads the retrieval configuration, connects the process-scoped clients,
/// serves until SIGTERM/Ctrl+C, and closes the pooled connections on the
/// way out.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_target(false)
        .json()
        .init();

    let metrics_handle = if config.metrics_enabled {
        Some(
            PrometheusBuilder::new()
                .install_recorder()
                .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {e}"))?,
        )
    } else {
        None
    };

    // Connect the process-scoped retrieval clients; fails fast on bad config
    let retrieval_config = RetrievalConfig::load()?;
    let context = RetrievalContext::connect(&retrieval_config).await?;
    let retriever = context
        .retriever()
        .with_metrics(Arc::new(PrometheusStageMetrics));

    let state = Arc::new(ServerState::new(config.clone(), retriever, metrics_handle));
    let app = build_router(state);

    let addr: SocketAddr = config.socket_addr()?;
    tracing::info!(
        "Starting faqline server on {} (timeout: {}s, cors: {}, metrics: {})",
        addr,
        config.timeout_secs,
        config.enable_cors,
        config.metrics_enabled
    );
    tracing::info!(
        limit = retrieval_config.search.limit,
        num_candidates = retrieval_config.search.num_candidates,
        "retrieval pipeline ready"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    context.shutdown().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use faqline::{
        EmbedError, FaqIndex, FaqMatch, QueryEmbedder, Retriever, SearchSettings, StoreError,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    struct FixedEmbedder;

    #[async_trait]
    impl QueryEmbedder for FixedEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
            if text.trim().is_empty() {
                return Err(EmbedError::InvalidInput("query text is empty".into()));
            }
            Ok(vec![0.1; 8])
        }
    }

    struct BrokenEmbedder;

    #[async_trait]
    impl QueryEmbedder for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            Err(EmbedError::Unavailable("HTTP 503".into()))
        }
    }

    struct FixedIndex(Vec<FaqMatch>);

    #[async_trait]
    impl FaqIndex for FixedIndex {
        async fn top_k(
            &self,
            _vector: &[f32],
            limit: u32,
            _num_candidates: u32,
        ) -> Result<Vec<FaqMatch>, StoreError> {
            Ok(self.0.iter().take(limit as usize).cloned().collect())
        }
    }

    fn test_state(retriever: Retriever) -> Arc<ServerState> {
        Arc::new(ServerState::new(ServerConfig::default(), retriever, None))
    }

    fn faq(question: &str, score: f64) -> FaqMatch {
        FaqMatch {
            question: question.into(),
            answer: format!("answer to {question}"),
            score,
        }
    }

    fn search_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/search")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body")
            .to_bytes();
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn search_returns_matches_with_timing_block() {
        let retriever = Retriever::new(
            Arc::new(FixedEmbedder),
            Arc::new(FixedIndex(vec![
                faq("What is your return policy?", 0.91),
                faq("How long does shipping take?", 0.87),
            ])),
            SearchSettings {
                limit: 2,
                num_candidates: 5,
            },
        );
        let app = build_router(test_state(retriever));

        let response = app
            .oneshot(search_request(r#"{"query":"What is your return policy?"}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let matches = body["matches"].as_array().expect("matches array");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0]["score"].as_f64(), Some(0.91));
        assert_eq!(matches[1]["score"].as_f64(), Some(0.87));
        assert!(body["timing"]["total_ms"].is_number());
        let embed_pct = body["timing"]["embedding_percent"].as_f64().expect("pct");
        let search_pct = body["timing"]["search_percent"].as_f64().expect("pct");
        assert!((embed_pct + search_pct - 100.0).abs() < 1.0);
    }

    #[tokio::test]
    async fn empty_query_is_rejected_with_400() {
        let retriever = Retriever::new(
            Arc::new(FixedEmbedder),
            Arc::new(FixedIndex(Vec::new())),
            SearchSettings {
                limit: 2,
                num_candidates: 5,
            },
        );
        let app = build_router(test_state(retriever));

        let response = app
            .oneshot(search_request(r#"{"query":"   "}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn zero_matches_is_an_ok_empty_response() {
        let retriever = Retriever::new(
            Arc::new(FixedEmbedder),
            Arc::new(FixedIndex(Vec::new())),
            SearchSettings {
                limit: 2,
                num_candidates: 5,
            },
        );
        let app = build_router(test_state(retriever));

        let response = app
            .oneshot(search_request(r#"{"query":"unknown topic"}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["matches"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn embedding_outage_surfaces_stage_in_error_body() {
        let retriever = Retriever::new(
            Arc::new(BrokenEmbedder),
            Arc::new(FixedIndex(vec![faq("q", 0.5)])),
            SearchSettings {
                limit: 2,
                num_candidates: 5,
            },
        );
        let app = build_router(test_state(retriever));

        let response = app
            .oneshot(search_request(r#"{"query":"anything"}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "EMBEDDING_UNAVAILABLE");
        assert_eq!(body["error"]["stage"], "embedding");
    }

    #[tokio::test]
    async fn health_endpoint_is_public() {
        let retriever = Retriever::new(
            Arc::new(FixedEmbedder),
            Arc::new(FixedIndex(Vec::new())),
            SearchSettings {
                limit: 1,
                num_candidates: 1,
            },
        );
        let app = build_router(test_state(retriever));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let retriever = Retriever::new(
            Arc::new(FixedEmbedder),
            Arc::new(FixedIndex(Vec::new())),
            SearchSettings {
                limit: 1,
                num_candidates: 1,
            },
        );
        let app = build_router(test_state(retriever));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/nope")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
