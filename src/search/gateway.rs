//! Best-effort search: semantic first, lexical on unsupported feature,
//! empty results on any other failure

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::query::build_query_body;
use super::BackendError;
use super::IndexResolver;
use super::QueryMode;
use super::SearchBackend;
use crate::config::SearchConfig;
use crate::models::FilterSet;
use crate::models::SearchHit;

/// Outcome of one request against the backend
#[derive(Debug, Clone, PartialEq)]
pub enum SearchAttempt {
    Hits(Vec<SearchHit>),
    /// The semantic query is unsupported; the same request should be retried lexically
    Downgrade(String),
    Fail(BackendError),
}

pub struct SearchGateway {
    backend: Option<Arc<dyn SearchBackend>>,
    resolver: IndexResolver,
    semantic_inference_id: Option<String>,
    result_size: usize,
}

impl SearchGateway {
    /// `backend` is `None` when no search endpoint is configured
    pub fn new(backend: Option<Arc<dyn SearchBackend>>, config: &SearchConfig) -> Self {
        let semantic_inference_id = Some(config.semantic_inference_id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        Self {
            backend,
            resolver: IndexResolver::new(
                config.default_index.clone(),
                &config.locale_index_overrides,
            ),
            semantic_inference_id,
            result_size: config.result_size,
        }
    }

    pub fn enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn resolve_index(&self, locale: Option<&str>) -> &str {
        self.resolver.resolve(locale)
    }

    /// Semantic when an inference endpoint backs the content field
    pub fn preferred_mode(&self) -> QueryMode {
        if self.semantic_inference_id.is_some() {
            QueryMode::Semantic
        } else {
            QueryMode::Lexical
        }
    }

    /// Issue one request and classify its outcome. Only a semantic request can
    /// downgrade; an unsupported feature on a lexical request is a failure.
    pub async fn attempt(
        backend: &dyn SearchBackend,
        index: &str,
        body: &Value,
        mode: QueryMode,
    ) -> SearchAttempt {
        match backend.search(index, body).await {
            Ok(hits) => SearchAttempt::Hits(hits),
            Err(BackendError::UnsupportedFeature(reason)) if mode == QueryMode::Semantic => {
                SearchAttempt::Downgrade(reason)
            }
            Err(err) => SearchAttempt::Fail(err),
        }
    }

    /// Search `query` with optional filters, locale routing and size override.
    /// Never fails: backend errors degrade to an empty result.
    pub async fn search(
        &self,
        query: &str,
        filters: Option<&FilterSet>,
        locale: Option<&str>,
        size: Option<usize>,
    ) -> Vec<SearchHit> {
        let Some(backend) = self.backend.as_deref() else {
            debug!("Search backend disabled, skipping retrieval");
            return Vec::new();
        };

        let index = self.resolve_index(locale);
        let size = size.filter(|s| *s > 0).unwrap_or(self.result_size);
        let filters = filters.filter(|f| !f.is_empty());
        let mode = self.preferred_mode();

        debug!("Searching index {} ({:?}, size {})", index, mode, size);
        let body = build_query_body(query, filters, mode, size);

        let hits = match Self::attempt(backend, index, &body, mode).await {
            SearchAttempt::Hits(hits) => hits,
            SearchAttempt::Downgrade(reason) => {
                warn!("Semantic search unsupported, falling back to lexical: {}", reason);
                let lexical = build_query_body(query, filters, QueryMode::Lexical, size);
                backend.search(index, &lexical).await.unwrap_or_else(|err| {
                    warn!("Lexical search failed: {}", err);
                    Vec::new()
                })
            }
            SearchAttempt::Fail(err) => {
                warn!("Search failed: {}", err);
                Vec::new()
            }
        };

        let indices: BTreeSet<&str> = hits.iter().map(SearchHit::index_name).collect();
        info!(
            query = %query,
            hit_count = hits.len(),
            indices = ?indices,
            "elastic_query_completed"
        );

        hits
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::search::RankedIndex;

    /// Replays scripted responses and records every request body
    #[derive(Default)]
    struct ScriptedBackend {
        responses: Mutex<VecDeque<Result<Vec<SearchHit>, BackendError>>>,
        requests: Mutex<Vec<(String, Value)>>,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<Result<Vec<SearchHit>, BackendError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::default(),
            })
        }

        fn requests(&self) -> Vec<(String, Value)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchBackend for ScriptedBackend {
        async fn search(&self, index: &str, body: &Value) -> Result<Vec<SearchHit>, BackendError> {
            self.requests
                .lock()
                .unwrap()
                .push((index.to_string(), body.clone()));
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn rerank(
            &self,
            _inference_id: &str,
            _query: &str,
            _texts: &[String],
        ) -> Result<Vec<RankedIndex>, BackendError> {
            Ok(Vec::new())
        }
    }

    fn hit(id: &str) -> SearchHit {
        SearchHit {
            id: Some(id.to_string()),
            index: Some("knowledge-base".to_string()),
            score: Some(1.0),
            ..Default::default()
        }
    }

    fn gateway(backend: Arc<ScriptedBackend>, semantic: &str) -> SearchGateway {
        let config = SearchConfig {
            endpoint: "http://localhost:9200".to_string(),
            semantic_inference_id: semantic.to_string(),
            locale_index_overrides: HashMap::from([("fr".to_string(), "kb-fr".to_string())]),
            ..Default::default()
        };
        SearchGateway::new(Some(backend), &config)
    }

    #[tokio::test]
    async fn test_semantic_success() {
        let backend = ScriptedBackend::new(vec![Ok(vec![hit("a"), hit("b")])]);
        let gateway = gateway(backend.clone(), "embedder");

        let hits = gateway.search("disk full", None, None, None).await;

        assert_eq!(hits.len(), 2);
        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, "knowledge-base");
        assert!(requests[0].1["query"].get("semantic").is_some());
        assert_eq!(requests[0].1["size"], json!(8));
    }

    #[tokio::test]
    async fn test_unsupported_semantic_retries_lexical_once() {
        let backend = ScriptedBackend::new(vec![
            Err(BackendError::UnsupportedFeature(
                "unknown field [inference_id]".to_string(),
            )),
            Ok(vec![hit("lexical")]),
        ]);
        let gateway = gateway(backend.clone(), "embedder");

        let hits = gateway.search("disk full", None, Some("fr-FR"), Some(3)).await;

        assert_eq!(hits, vec![hit("lexical")]);
        let requests = backend.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].0, "kb-fr");
        assert!(requests[1].1["query"].get("match").is_some());
        assert_eq!(requests[1].1["size"], json!(3));
    }

    #[tokio::test]
    async fn test_failed_lexical_retry_is_final() {
        let backend = ScriptedBackend::new(vec![
            Err(BackendError::UnsupportedFeature("semantic".to_string())),
            Err(BackendError::UnsupportedFeature("match".to_string())),
            Ok(vec![hit("never")]),
        ]);
        let gateway = gateway(backend.clone(), "embedder");

        assert!(gateway.search("disk full", None, None, None).await.is_empty());
        assert_eq!(backend.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_generic_failure_returns_empty() {
        let backend = ScriptedBackend::new(vec![Err(BackendError::Transport(
            "connection refused".to_string(),
        ))]);
        let gateway = gateway(backend.clone(), "embedder");

        assert!(gateway.search("disk full", None, None, None).await.is_empty());
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_other_bad_request_does_not_retry() {
        let backend = ScriptedBackend::new(vec![Err(BackendError::BadRequest(
            "failed to parse query".to_string(),
        ))]);
        let gateway = gateway(backend.clone(), "embedder");

        assert!(gateway.search("disk full", None, None, None).await.is_empty());
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_lexical_mode_never_downgrades() {
        let backend = ScriptedBackend::new(vec![Err(BackendError::UnsupportedFeature(
            "whatever".to_string(),
        ))]);
        let gateway = gateway(backend.clone(), "");

        assert_eq!(gateway.preferred_mode(), QueryMode::Lexical);
        assert!(gateway.search("disk full", None, None, None).await.is_empty());
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_attempt_classification() {
        let backend = ScriptedBackend::new(vec![
            Err(BackendError::UnsupportedFeature("semantic".to_string())),
            Err(BackendError::UnsupportedFeature("semantic".to_string())),
        ]);
        let body = json!({});

        let semantic =
            SearchGateway::attempt(backend.as_ref(), "kb", &body, QueryMode::Semantic).await;
        assert_eq!(semantic, SearchAttempt::Downgrade("semantic".to_string()));

        let lexical =
            SearchGateway::attempt(backend.as_ref(), "kb", &body, QueryMode::Lexical).await;
        assert!(matches!(lexical, SearchAttempt::Fail(_)));
    }

    #[tokio::test]
    async fn test_disabled_gateway_returns_empty() {
        let gateway = SearchGateway::new(None, &SearchConfig::default());
        assert!(!gateway.enabled());
        assert!(gateway.search("anything", None, None, None).await.is_empty());
    }

    #[tokio::test]
    async fn test_filters_are_applied() {
        let backend = ScriptedBackend::new(vec![Ok(vec![])]);
        let gateway = gateway(backend.clone(), "embedder");
        let mut filters = FilterSet::new();
        filters.extend("tags", ["policy"]);

        gateway.search("byod", Some(&filters), None, None).await;

        let body = &backend.requests()[0].1;
        assert_eq!(
            body["query"]["bool"]["filter"],
            json!([{"terms": {"tags": ["policy"]}}])
        );
    }
}
