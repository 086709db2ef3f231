use thiserror::Error;

/// Errors surfaced by the similarity search client.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Configuration is inconsistent (empty URI, bad pool sizes, ...).
    #[error("invalid store config: {0}")]
    InvalidConfig(String),
    /// A per-query precondition failed (vector length, limit bounds).
    /// Primary enforcement happens at startup; hitting this at query time
    /// means a caller bypassed the validated settings.
    #[error("invalid similarity query: {0}")]
    InvalidQuery(String),
    /// No suitable server could be selected within the selection timeout.
    #[error("vector store connect timeout: {0}")]
    ConnectTimeout(String),
    /// The vector store was unreachable or rejected the query.
    #[error("vector store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether a caller-side retry with backoff can plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::ConnectTimeout(_) | StoreError::Unavailable(_)
        )
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { message, .. } => {
                StoreError::ConnectTimeout(message.clone())
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}
