use serde_json::{json, Value};
use tracing::debug;

use crate::gate::ConnectionGate;
use crate::{EmbedConfig, EmbedError};

/// Client for the remote text-to-vector inference service.
///
/// Owns a pooled HTTP client and a bounded in-flight gate. Constructed
/// once at startup from validated configuration and shared across
/// requests; cloning is cheap and shares both pools.
#[derive(Debug, Clone)]
pub struct EmbedClient {
    http: reqwest::Client,
    gate: ConnectionGate,
    url: String,
    api_key: String,
    dimension: usize,
}

impl EmbedClient {
    /// Build a client from `cfg`. Fails with [`EmbedError::InvalidConfig`]
    /// when required values are absent; no network activity happens here.
    pub fn new(cfg: &EmbedConfig) -> Result<Self, EmbedError> {
        cfg.validate()?;

        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout())
            .connect_timeout(cfg.connect_timeout())
            .pool_max_idle_per_host(cfg.pool_max_idle)
            .pool_idle_timeout(cfg.pool_idle_timeout())
            .build()
            .map_err(|e| EmbedError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            gate: ConnectionGate::new(cfg.max_in_flight, cfg.acquire_timeout()),
            url: cfg.request_url(),
            api_key: cfg.api_key.clone(),
            dimension: cfg.dimension,
        })
    }

    /// Convert `text` into a fixed-length embedding vector.
    ///
    /// Blank input is rejected before any permit or network activity. The
    /// call makes exactly one request; retry policy belongs to the caller.
    /// Dropping the returned future cancels the in-flight request and
    /// releases the gate slot.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        if text.trim().is_empty() {
            return Err(EmbedError::InvalidInput("query text is empty".into()));
        }

        let _slot = self.gate.acquire().await?;

        let response = self
            .http
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(&json!({ "input": text }))
            .send()
            .await
            .map_err(|e| EmbedError::Unavailable(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(EmbedError::Unavailable(format!("HTTP {status}: {detail}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| EmbedError::Unavailable(format!("invalid JSON response: {e}")))?;

        let vector = parse_embedding_response(payload)?;
        if vector.len() != self.dimension {
            return Err(EmbedError::DimensionMismatch {
                expected: self.dimension,
                got: vector.len(),
            });
        }

        debug!(dimension = vector.len(), "embedding generated");
        Ok(vector)
    }

    /// Free in-flight slots, surfaced for observability.
    pub fn available_slots(&self) -> usize {
        self.gate.available()
    }
}

/// Extract the first embedding vector from the engine's response body.
///
/// Accepts the OpenAI shape (`{"data": [{"embedding": [...]}]}`), an
/// `embeddings`-keyed body, and a bare array.
fn parse_embedding_response(value: Value) -> Result<Vec<f32>, EmbedError> {
    match value {
        Value::Object(mut map) => {
            if let Some(Value::Array(items)) = map.remove("data") {
                match items.into_iter().next() {
                    Some(Value::Object(mut obj)) => match obj.remove("embedding") {
                        Some(embedding) => parse_vector(embedding),
                        None => Err(EmbedError::Unavailable(
                            "missing `embedding` field in data item".into(),
                        )),
                    },
                    Some(_) => Err(EmbedError::Unavailable(
                        "unexpected entry inside `data` array".into(),
                    )),
                    None => Err(EmbedError::Unavailable("response `data` array is empty".into())),
                }
            } else if let Some(embeddings) = map.remove("embeddings") {
                match embeddings {
                    Value::Array(items)
                        if matches!(items.first(), Some(Value::Array(_))) =>
                    {
                        match items.into_iter().next() {
                            Some(first) => parse_vector(first),
                            None => Err(EmbedError::Unavailable(
                                "response `embeddings` array is empty".into(),
                            )),
                        }
                    }
                    other => parse_vector(other),
                }
            } else {
                Err(EmbedError::Unavailable("unsupported response shape".into()))
            }
        }
        Value::Array(_) => parse_vector(value),
        other => Err(EmbedError::Unavailable(format!(
            "embedding response must be an object or array, got {other:?}"
        ))),
    }
}

fn parse_vector(value: Value) -> Result<Vec<f32>, EmbedError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| EmbedError::Unavailable("non-finite embedding value".into())),
                other => Err(EmbedError::Unavailable(format!(
                    "embedding entries must be numbers, got {other:?}"
                ))),
            })
            .collect(),
        other => Err(EmbedError::Unavailable(format!(
            "embedding vector must be an array, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> EmbedConfig {
        EmbedConfig {
            // Unroutable on purpose: no test below should reach the network.
            endpoint: "http://127.0.0.1:1".into(),
            api_key: "test-key".into(),
            dimension: 3,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn blank_input_fails_before_any_network_call() {
        let client = EmbedClient::new(&test_config()).expect("client");

        for input in ["", "   ", "\n\t"] {
            let err = client.embed(input).await.expect_err("blank input");
            assert!(
                matches!(err, EmbedError::InvalidInput(_)),
                "{input:?} produced {err:?}"
            );
        }
        // Every permit came back.
        assert_eq!(client.available_slots(), test_config().max_in_flight);
    }

    #[test]
    fn new_rejects_unconfigured_client() {
        let err = EmbedClient::new(&EmbedConfig::default()).expect_err("empty config");
        assert!(matches!(err, EmbedError::InvalidConfig(_)));
    }

    #[test]
    fn parse_openai_response_shape() {
        let body = json!({ "data": [ { "embedding": [0.1, 0.2, 0.3] } ] });
        let vector = parse_embedding_response(body).expect("parse");
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn parse_takes_first_data_item() {
        let body = json!({
            "data": [
                { "embedding": [1.0, 2.0] },
                { "embedding": [3.0, 4.0] }
            ]
        });
        assert_eq!(parse_embedding_response(body).expect("parse"), vec![1.0, 2.0]);
    }

    #[test]
    fn parse_embeddings_keyed_and_bare_array_shapes() {
        let nested = json!({ "embeddings": [[0.5, 0.6]] });
        assert_eq!(parse_embedding_response(nested).expect("parse"), vec![0.5, 0.6]);

        let flat = json!({ "embeddings": [0.5, 0.6] });
        assert_eq!(parse_embedding_response(flat).expect("parse"), vec![0.5, 0.6]);

        let bare = json!([0.7, 0.8]);
        assert_eq!(parse_embedding_response(bare).expect("parse"), vec![0.7, 0.8]);
    }

    #[test]
    fn parse_rejects_malformed_bodies() {
        for body in [
            json!({}),
            json!({ "data": [] }),
            json!({ "data": [ { "no_embedding": true } ] }),
            json!({ "data": [ { "embedding": "not-an-array" } ] }),
            json!({ "data": [ { "embedding": [0.1, "x"] } ] }),
            json!("just a string"),
        ] {
            let err = parse_embedding_response(body).expect_err("malformed body");
            assert!(matches!(err, EmbedError::Unavailable(_)));
        }
    }
}
