use serde::{Deserialize, Serialize};

/// One FAQ entry matched by a similarity query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaqMatch {
    /// Stored question text.
    pub question: String,
    /// Stored answer text.
    pub answer: String,
    /// Dot-product similarity against the query vector; higher is closer.
    pub score: f64,
}
