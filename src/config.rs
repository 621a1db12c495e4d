use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::CopilotError;

/// Environment variable prefix, e.g. `COPILOT__SEARCH__ENDPOINT`
pub const ENV_PREFIX: &str = "COPILOT";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    /// Allowed origins; empty means any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Directory for daily-rolling log files; console only when unset
    pub log_dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Elasticsearch endpoint; search is disabled when empty
    pub endpoint: String,
    pub api_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub default_index: String,
    pub request_timeout_secs: u64,
    /// Inference endpoint backing `semantic` queries; lexical search when empty
    pub semantic_inference_id: String,
    /// Rerank inference endpoint; reranking is skipped when empty
    pub rerank_inference_id: String,
    pub result_size: usize,
    pub max_context_citations: usize,
    /// Locale (or primary language subtag) to index name
    pub locale_index_overrides: HashMap<String, String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            username: None,
            password: None,
            default_index: default_index_name(),
            request_timeout_secs: 30,
            semantic_inference_id: "google_vertex_ai_embedding".to_string(),
            rerank_inference_id: String::new(),
            result_size: 8,
            max_context_citations: 4,
            locale_index_overrides: HashMap::new(),
        }
    }
}

pub(crate) fn default_index_name() -> String {
    "knowledge-base".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the generation API
    pub endpoint: String,
    /// Project hosting the model; generation is disabled when empty
    pub project_id: String,
    pub location: String,
    pub model: String,
    /// Bearer token sent with generation requests
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://us-central1-aiplatform.googleapis.com".to_string(),
            project_id: String::new(),
            location: "us-central1".to_string(),
            model: "gemini-1.5-pro".to_string(),
            api_key: None,
            temperature: 0.2,
            max_output_tokens: 768,
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub slack_webhook_url: Option<String>,
    pub slack_access_token: Option<String>,
    pub slack_api_base: String,
    pub default_channel: String,
    pub jira_webhook_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            slack_webhook_url: None,
            slack_access_token: None,
            slack_api_base: "https://slack.com/api".to_string(),
            default_channel: "#sev-1-war-room".to_string(),
            jira_webhook_url: None,
            request_timeout_secs: 10,
        }
    }
}

impl NotificationsConfig {
    /// Whether follow-up notifications have somewhere to go
    pub fn is_configured(&self) -> bool {
        non_empty(&self.slack_webhook_url).is_some() || non_empty(&self.slack_access_token).is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub notifications: NotificationsConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `config.toml` (if present) overlaid with
    /// `COPILOT__*` environment variables
    pub fn load() -> crate::Result<Self> {
        Self::load_from("config.toml")
    }

    /// Same as [`AppConfig::load`] with an explicit file path
    pub fn load_from<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        Self::load_with_env(path.as_ref(), None)
    }

    /// Layer `path` with `COPILOT__*` variables read from `env`, or from the
    /// process environment when `None`
    pub(crate) fn load_with_env(
        path: &Path,
        env: Option<config::Map<String, String>>,
    ) -> crate::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let mut config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate values and normalise locale override keys to lower case
    pub fn validate(&mut self) -> crate::Result<()> {
        if !self.search.endpoint.is_empty() {
            url::Url::parse(&self.search.endpoint).map_err(|e| {
                CopilotError::Config(format!(
                    "invalid search endpoint '{}': {e}",
                    self.search.endpoint
                ))
            })?;
        }
        if self.llm_enabled() {
            url::Url::parse(&self.llm.endpoint).map_err(|e| {
                CopilotError::Config(format!("invalid llm endpoint '{}': {e}", self.llm.endpoint))
            })?;
        }
        for webhook in [
            &self.notifications.slack_webhook_url,
            &self.notifications.jira_webhook_url,
        ] {
            if let Some(hook) = non_empty(webhook) {
                url::Url::parse(hook)
                    .map_err(|e| CopilotError::Config(format!("invalid webhook '{hook}': {e}")))?;
            }
        }
        if self.search.result_size == 0 {
            return Err(CopilotError::Config(
                "search.result_size must be greater than zero".to_string(),
            ));
        }
        if self.search.max_context_citations == 0 {
            return Err(CopilotError::Config(
                "search.max_context_citations must be greater than zero".to_string(),
            ));
        }
        if self.search.default_index.trim().is_empty() {
            self.search.default_index = default_index_name();
        }

        self.search.locale_index_overrides = std::mem::take(&mut self.search.locale_index_overrides)
            .into_iter()
            .filter(|(_, index)| !index.trim().is_empty())
            .map(|(locale, index)| (locale.to_lowercase(), index))
            .collect();

        Ok(())
    }

    /// Whether a search backend is configured
    pub fn search_enabled(&self) -> bool {
        !self.search.endpoint.trim().is_empty()
    }

    /// Whether a generation capability is configured
    pub fn llm_enabled(&self) -> bool {
        !self.llm.project_id.trim().is_empty()
    }

    /// Whether follow-up notifications have somewhere to go
    pub fn notifications_configured(&self) -> bool {
        self.notifications.is_configured()
    }

    /// Get search endpoint
    pub fn search_endpoint(&self) -> &str {
        &self.search.endpoint
    }

    /// Get default index name
    pub fn default_index(&self) -> &str {
        &self.search.default_index
    }

    /// Get default notification channel
    pub fn default_channel(&self) -> &str {
        &self.notifications.default_channel
    }
}

/// Treat `Some("")` coming from env files the same as an absent value
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
