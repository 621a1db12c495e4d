//! Search backend access
//!
//! - [`SearchBackend`]: the capability the pipeline consumes (search + rerank inference)
//! - [`ElasticClient`]: Elasticsearch implementation over its REST API
//! - [`SearchGateway`]: index resolution, query construction and the
//!   semantic-to-lexical fallback strategy

pub mod elastic;
pub mod gateway;
pub mod query;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub use elastic::ElasticClient;
pub use gateway::SearchAttempt;
pub use gateway::SearchGateway;
pub use query::IndexResolver;
pub use query::QueryMode;

use crate::models::SearchHit;

/// Failures reported by a search backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The backend lacks a capability the request relies on (e.g. `semantic` queries)
    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("search backend is not configured")]
    Disabled,
}

/// One entry of a rerank response. Both fields are optional because the
/// response is not trusted to be well formed.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RankedIndex {
    #[serde(default)]
    pub index: Option<i64>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
}

impl RankedIndex {
    pub const fn new(index: i64, relevance_score: f64) -> Self {
        Self {
            index: Some(index),
            relevance_score: Some(relevance_score),
        }
    }
}

/// Document index plus relevance-scoring capability
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a query body against `index`
    async fn search(&self, index: &str, body: &Value) -> Result<Vec<SearchHit>, BackendError>;

    /// Score `texts` against `query` with the inference endpoint `inference_id`
    async fn rerank(
        &self,
        inference_id: &str,
        query: &str,
        texts: &[String],
    ) -> Result<Vec<RankedIndex>, BackendError>;
}
