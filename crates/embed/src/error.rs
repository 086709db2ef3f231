use thiserror::Error;

/// Errors surfaced by [`EmbedClient::embed`](crate::EmbedClient::embed).
#[derive(Debug, Error)]
pub enum EmbedError {
    /// Query text was empty or whitespace-only. Caller error; never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Configuration is inconsistent (empty endpoint, zero dimension, ...).
    #[error("invalid embed config: {0}")]
    InvalidConfig(String),
    /// No in-flight slot became available within the acquire timeout.
    #[error("embedding pool exhausted: {0}")]
    PoolExhausted(String),
    /// The embedding engine was unreachable, returned a non-success status,
    /// or produced a body that could not be interpreted.
    #[error("embedding engine unavailable: {0}")]
    Unavailable(String),
    /// The engine returned a vector whose length disagrees with the
    /// configured index dimensionality. Model/config drift; not retryable.
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

impl EmbedError {
    /// Whether a caller-side retry with backoff can plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EmbedError::PoolExhausted(_) | EmbedError::Unavailable(_)
        )
    }
}
