//! In-memory collaborators shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use opscopilot::config::AppConfig;
use opscopilot::errors::CopilotError;
use opscopilot::llm::TextGenerator;
use opscopilot::models::SearchHit;
use opscopilot::search::BackendError;
use opscopilot::search::RankedIndex;
use opscopilot::search::SearchBackend;
use serde_json::Value;

/// Replays scripted search responses and records every call
#[derive(Default)]
pub struct FakeBackend {
    searches: Mutex<VecDeque<Result<Vec<SearchHit>, BackendError>>>,
    rankings: Mutex<Option<Result<Vec<RankedIndex>, BackendError>>>,
    pub search_calls: Mutex<Vec<(String, Value)>>,
    pub rerank_calls: Mutex<Vec<(String, String, Vec<String>)>>,
}

impl FakeBackend {
    pub fn with_hits(hits: Vec<SearchHit>) -> Arc<Self> {
        Self::scripted(vec![Ok(hits)])
    }

    pub fn scripted(searches: Vec<Result<Vec<SearchHit>, BackendError>>) -> Arc<Self> {
        Arc::new(Self {
            searches: Mutex::new(searches.into()),
            ..Default::default()
        })
    }

    pub fn set_rankings(&self, rankings: Result<Vec<RankedIndex>, BackendError>) {
        *self.rankings.lock().unwrap() = Some(rankings);
    }

    pub fn search_calls(&self) -> Vec<(String, Value)> {
        self.search_calls.lock().unwrap().clone()
    }

    pub fn rerank_calls(&self) -> Vec<(String, String, Vec<String>)> {
        self.rerank_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for FakeBackend {
    async fn search(&self, index: &str, body: &Value) -> Result<Vec<SearchHit>, BackendError> {
        self.search_calls
            .lock()
            .unwrap()
            .push((index.to_string(), body.clone()));
        self.searches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn rerank(
        &self,
        inference_id: &str,
        query: &str,
        texts: &[String],
    ) -> Result<Vec<RankedIndex>, BackendError> {
        self.rerank_calls.lock().unwrap().push((
            inference_id.to_string(),
            query.to_string(),
            texts.to_vec(),
        ));
        self.rankings
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// One recorded generation request
#[derive(Debug, Clone)]
pub struct Generation {
    pub system_prompt: String,
    pub user_prompt: String,
    pub locale: Option<String>,
}

/// Generator returning a fixed answer or failure, recording its inputs
pub struct FakeGenerator {
    enabled: bool,
    answer: Result<String, String>,
    pub calls: Mutex<Vec<Generation>>,
}

impl FakeGenerator {
    pub fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            enabled: true,
            answer: Ok(answer.to_string()),
            calls: Mutex::default(),
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            enabled: true,
            answer: Err(reason.to_string()),
            calls: Mutex::default(),
        })
    }

    pub fn disabled() -> Arc<Self> {
        Arc::new(Self {
            enabled: false,
            answer: Ok(String::new()),
            calls: Mutex::default(),
        })
    }

    pub fn calls(&self) -> Vec<Generation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        locale: Option<&str>,
    ) -> opscopilot::Result<String> {
        self.calls.lock().unwrap().push(Generation {
            system_prompt: system_prompt.to_string(),
            user_prompt: user_prompt.to_string(),
            locale: locale.map(str::to_string),
        });
        self.answer.clone().map_err(CopilotError::Llm)
    }
}

/// Configuration with search enabled, a French index override and a
/// notification destination
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.search.endpoint = "http://localhost:9200".to_string();
    config.search.locale_index_overrides =
        HashMap::from([("fr".to_string(), "knowledge-base-fr".to_string())]);
    config.notifications.slack_webhook_url =
        Some("https://hooks.slack.com/services/T000/B000/XXXX".to_string());
    config
}

pub fn hit(id: &str, source: Value) -> SearchHit {
    SearchHit {
        id: Some(id.to_string()),
        index: Some("knowledge-base".to_string()),
        score: Some(1.0),
        source: serde_json::from_value(source).unwrap(),
        rerank_score: None,
    }
}

/// Top-ranked open SEV1 incident ticket
pub fn sev1_ticket() -> SearchHit {
    hit(
        "INC-1042",
        serde_json::json!({
            "title": "Checkout API returning 500s",
            "content": "Payments service failing health checks in eu-west-1 since 09:12 UTC.",
            "tags": ["ticket", "incident"],
            "severity": "SEV1",
            "status": "open",
            "owner": "payments-oncall",
            "service": "checkout",
            "uri": "https://tickets.example.com/INC-1042"
        }),
    )
}
