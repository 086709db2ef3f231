use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use tracing::debug;

use crate::{FaqMatch, StoreConfig, StoreError};

/// Field inside each FAQ document that stores the precomputed vector.
pub const VECTOR_PATH: &str = "embedding";

/// Read-only client for top-k similarity queries over the FAQ corpus.
///
/// Pooling lives in the driver: `min_pool_size` connections are kept warm,
/// the pool is capped at `max_pool_size`, and idle connections are evicted
/// after the idle timeout. Cloning shares the pool.
#[derive(Clone, Debug)]
pub struct FaqStore {
    client: Client,
    faqs: Collection<FaqMatch>,
    index: String,
    dimension: usize,
}

impl FaqStore {
    /// Parse the connection string, apply the pool policy, and bind the
    /// FAQ collection. The driver connects lazily; no query is issued here.
    pub async fn connect(cfg: &StoreConfig) -> Result<Self, StoreError> {
        cfg.validate()?;

        let mut options = ClientOptions::parse(&cfg.uri)
            .await
            .map_err(|e| StoreError::InvalidConfig(format!("bad connection string: {e}")))?;
        options.app_name = Some("faqline".into());
        options.max_pool_size = Some(cfg.max_pool_size);
        options.min_pool_size = Some(cfg.min_pool_size);
        options.max_idle_time = Some(cfg.idle_timeout());
        options.connect_timeout = Some(cfg.connect_timeout());
        options.server_selection_timeout = Some(cfg.selection_timeout());

        let client = Client::with_options(options)
            .map_err(|e| StoreError::InvalidConfig(format!("client init failed: {e}")))?;
        let faqs = client
            .database(&cfg.database)
            .collection::<FaqMatch>(&cfg.collection);

        Ok(Self {
            client,
            faqs,
            index: cfg.index.clone(),
            dimension: cfg.dimension,
        })
    }

    /// Run one top-k similarity query.
    ///
    /// Returns at most `limit` matches ordered by descending score; zero
    /// matching documents is a successful empty result. The store is never
    /// mutated by this path.
    pub async fn top_k(
        &self,
        vector: &[f32],
        limit: u32,
        num_candidates: u32,
    ) -> Result<Vec<FaqMatch>, StoreError> {
        check_query(vector.len(), self.dimension, limit, num_candidates)?;

        let pipeline = search_pipeline(&self.index, vector, limit, num_candidates);
        let mut cursor = self.faqs.aggregate(pipeline).with_type::<FaqMatch>().await?;

        let mut matches = Vec::with_capacity(limit as usize);
        while let Some(hit) = cursor.try_next().await? {
            matches.push(hit);
        }

        debug!(returned = matches.len(), limit, "similarity query complete");
        Ok(matches)
    }

    /// Close the pool, dropping warm connections. Further queries on any
    /// clone of this store will fail.
    pub async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}

/// Aggregation for one similarity lookup: a `$vectorSearch` over the
/// embedding field followed by a projection down to the response shape.
/// The score is the index's dot-product similarity.
fn search_pipeline(index: &str, vector: &[f32], limit: u32, num_candidates: u32) -> Vec<Document> {
    let query_vector: Vec<Bson> = vector.iter().map(|v| Bson::Double(f64::from(*v))).collect();

    vec![
        doc! {
            "$vectorSearch": {
                "index": index,
                "path": VECTOR_PATH,
                "queryVector": query_vector,
                "numCandidates": num_candidates as i64,
                "limit": limit as i64,
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "question": 1,
                "answer": 1,
                "score": { "$meta": "vectorSearchScore" },
            }
        },
    ]
}

fn check_query(
    got_dim: usize,
    want_dim: usize,
    limit: u32,
    num_candidates: u32,
) -> Result<(), StoreError> {
    if limit == 0 {
        return Err(StoreError::InvalidQuery("limit must be positive".into()));
    }
    if num_candidates < limit {
        return Err(StoreError::InvalidQuery(format!(
            "numCandidates ({num_candidates}) must be >= limit ({limit})"
        )));
    }
    if got_dim != want_dim {
        return Err(StoreError::InvalidQuery(format!(
            "query vector has {got_dim} dimensions, index expects {want_dim}"
        )));
    }
    Ok(())
}
