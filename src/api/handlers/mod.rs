/// API request handlers
use std::sync::Arc;

use axum::Json;

use crate::api::types::HealthResponse;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::llm::LlmService;
use crate::llm::TextGenerator;
use crate::metrics::Metrics;
use crate::notify::ActionExecutor;
use crate::rag::RagService;
use crate::search::ElasticClient;
use crate::search::SearchBackend;

pub mod chat;
pub mod status;

pub use chat::*;
pub use status::*;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub rag: Arc<RagService>,
    pub executor: Arc<ActionExecutor>,
    pub elastic: Arc<ElasticClient>,
    pub llm: Arc<LlmService>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// Build every service from configuration
    ///
    /// # Errors
    /// - HTTP client build errors
    /// - metric registration errors
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let metrics = Arc::new(Metrics::new()?);
        let elastic = Arc::new(ElasticClient::new(&config.search));
        let llm = Arc::new(LlmService::new(config.llm.clone())?);
        let executor = Arc::new(ActionExecutor::new(&config.notifications)?);

        let backend: Option<Arc<dyn SearchBackend>> = if elastic.enabled() {
            Some(elastic.clone())
        } else {
            None
        };
        let generator: Arc<dyn TextGenerator> = llm.clone();
        let rag = Arc::new(RagService::from_services(
            &config,
            backend,
            generator,
            Some(metrics.clone()),
        ));

        Ok(Self {
            config: Arc::new(config),
            rag,
            executor,
            elastic,
            llm,
            metrics,
        })
    }
}

/// Health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
