//! Elasticsearch client over the REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use tracing::info;

use super::BackendError;
use super::RankedIndex;
use super::SearchBackend;
use crate::config::non_empty;
use crate::config::SearchConfig;
use crate::models::SearchHit;

/// Error fragments Elasticsearch returns when `semantic` queries are not available
const UNSUPPORTED_MARKERS: [&str; 3] = [
    "unknown field [inference_id]",
    "unknown query [semantic]",
    "no [query] registered for [semantic]",
];

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: HitsEnvelope,
}

#[derive(Debug, Default, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Default, Deserialize)]
struct RerankResponse {
    #[serde(default)]
    rerank: Vec<RankedIndex>,
}

/// Cluster health as reported by `_cluster/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterHealth {
    pub status: String,
    #[serde(default)]
    pub cluster_name: Option<String>,
}

impl ClusterHealth {
    pub fn disabled() -> Self {
        Self {
            status: "disabled".to_string(),
            cluster_name: None,
        }
    }
}

/// Elasticsearch client. The HTTP client is created once, either eagerly by
/// [`ElasticClient::initialize`] or lazily on first use, and shared by all
/// requests until [`ElasticClient::shutdown`].
pub struct ElasticClient {
    endpoint: String,
    api_key: Option<String>,
    basic_auth: Option<(String, String)>,
    timeout: Duration,
    client: RwLock<Option<Client>>,
}

impl ElasticClient {
    pub fn new(config: &SearchConfig) -> Self {
        let basic_auth = match (non_empty(&config.username), non_empty(&config.password)) {
            (Some(user), Some(pass)) => Some((user.to_string(), pass.to_string())),
            _ => None,
        };
        Self {
            endpoint: config.endpoint.trim().trim_end_matches('/').to_string(),
            api_key: non_empty(&config.api_key).map(str::to_string),
            basic_auth,
            timeout: Duration::from_secs(config.request_timeout_secs),
            client: RwLock::new(None),
        }
    }

    pub fn enabled(&self) -> bool {
        !self.endpoint.is_empty()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the pooled HTTP client up front
    pub async fn initialize(&self) -> Result<(), BackendError> {
        self.ensure_client().await.map(|_| ())
    }

    /// Return the shared HTTP client, creating it on first use
    pub async fn ensure_client(&self) -> Result<Client, BackendError> {
        if !self.enabled() {
            return Err(BackendError::Disabled);
        }
        if let Some(client) = self.client.read().await.as_ref() {
            return Ok(client.clone());
        }

        let mut slot = self.client.write().await;
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        info!("Elasticsearch client initialized for {}", self.endpoint);
        *slot = Some(client.clone());
        Ok(client)
    }

    /// Drop the shared HTTP client; a later request recreates it
    pub async fn shutdown(&self) {
        if self.client.write().await.take().is_some() {
            info!("Elasticsearch client closed");
        }
    }

    pub async fn health(&self) -> Result<ClusterHealth, BackendError> {
        if !self.enabled() {
            return Ok(ClusterHealth::disabled());
        }
        let client = self.ensure_client().await?;
        let request = client.get(format!("{}/_cluster/health", self.endpoint));
        let response = self.send(request).await?;
        serde_json::from_str(&response).map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(key) = &self.api_key {
            request.header("Authorization", format!("ApiKey {key}"))
        } else if let Some((user, pass)) = &self.basic_auth {
            request.basic_auth(user, Some(pass))
        } else {
            request
        }
    }

    /// Send a request and return the raw body of a successful response
    async fn send(&self, request: RequestBuilder) -> Result<String, BackendError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(classify_error(status, &body))
        }
    }
}

#[async_trait]
impl SearchBackend for ElasticClient {
    async fn search(&self, index: &str, body: &Value) -> Result<Vec<SearchHit>, BackendError> {
        let client = self.ensure_client().await?;
        let url = format!("{}/{}/_search", self.endpoint, index);
        debug!("POST {}", url);

        let raw = self.send(client.post(&url).json(body)).await?;
        let parsed: SearchResponse =
            serde_json::from_str(&raw).map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(parsed.hits.hits)
    }

    async fn rerank(
        &self,
        inference_id: &str,
        query: &str,
        texts: &[String],
    ) -> Result<Vec<RankedIndex>, BackendError> {
        let client = self.ensure_client().await?;
        let url = format!("{}/_inference/{}", self.endpoint, inference_id);
        debug!("POST {} ({} inputs)", url, texts.len());

        let payload = json!({ "query": query, "input": texts });
        let raw = self.send(client.post(&url).json(&payload)).await?;
        let parsed: RerankResponse =
            serde_json::from_str(&raw).map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(parsed.rerank)
    }
}

/// Map an error response to a [`BackendError`]. A 400 naming a missing
/// semantic-search capability is `UnsupportedFeature`.
pub fn classify_error(status: StatusCode, body: &str) -> BackendError {
    if status != StatusCode::BAD_REQUEST {
        return BackendError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        };
    }

    let reason = error_reason(body).unwrap_or_else(|| body.to_string());
    let lowered = body.to_lowercase();
    if UNSUPPORTED_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        BackendError::UnsupportedFeature(reason)
    } else {
        BackendError::BadRequest(reason)
    }
}

/// `error.reason` from an Elasticsearch error body, preferring the root cause
fn error_reason(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    if let Some(reason) = error
        .get("root_cause")
        .and_then(Value::as_array)
        .and_then(|causes| causes.first())
        .and_then(|cause| cause.get("reason"))
        .and_then(Value::as_str)
    {
        return Some(reason.to_string());
    }
    match error {
        Value::String(reason) => Some(reason.clone()),
        other => other.get("reason").and_then(Value::as_str).map(str::to_string),
    }
}
