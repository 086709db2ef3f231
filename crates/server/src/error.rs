use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use faqline::{EmbedError, RetrievalError, StoreError};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

impl ServerError {
    /// Get HTTP status code for this error
    fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Retrieval(err) => match err {
                RetrievalError::Embedding(EmbedError::InvalidInput(_)) => StatusCode::BAD_REQUEST,
                RetrievalError::Embedding(EmbedError::PoolExhausted(_)) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                RetrievalError::Search(StoreError::ConnectTimeout(_)) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                RetrievalError::Embedding(_) | RetrievalError::Search(_) => StatusCode::BAD_GATEWAY,
                RetrievalError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    fn error_code(&self) -> &'static str {
        match self {
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::NotFound => "NOT_FOUND",
            ServerError::Retrieval(err) => match err {
                RetrievalError::Embedding(EmbedError::InvalidInput(_)) => "INVALID_INPUT",
                RetrievalError::Embedding(EmbedError::PoolExhausted(_)) => "POOL_EXHAUSTED",
                RetrievalError::Embedding(EmbedError::DimensionMismatch { .. }) => {
                    "DIMENSION_MISMATCH"
                }
                RetrievalError::Embedding(_) => "EMBEDDING_UNAVAILABLE",
                RetrievalError::Search(StoreError::ConnectTimeout(_)) => "STORE_TIMEOUT",
                RetrievalError::Search(_) => "SEARCH_UNAVAILABLE",
                RetrievalError::Config(_) => "CONFIG_ERROR",
            },
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Which pipeline stage failed, when the error came from the pipeline.
    fn stage(&self) -> Option<&'static str> {
        match self {
            ServerError::Retrieval(err) => Some(err.stage()),
            _ => None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code().to_string();
        let stage = self.stage();
        let message = self.to_string();

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
                "stage": stage,
            }
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::BadRequest(format!("JSON parse error: {err}"))
    }
}
