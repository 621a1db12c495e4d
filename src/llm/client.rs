//! Client for the `generateContent` REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::TextGenerator;
use crate::config::non_empty;
use crate::config::LlmConfig;
use crate::errors::CopilotError;
use crate::errors::Result;
use crate::rag::prompts::merge_prompt;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Model details reported on the integrations status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LlmMetadata {
    Disabled { status: String },
    Enabled { model: String, location: String },
}

/// Generation client
pub struct LlmService {
    config: LlmConfig,
    client: Client,
}

impl LlmService {
    /// Create a new generation client
    ///
    /// # Errors
    /// - HTTP client build errors
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CopilotError::Http(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn metadata(&self) -> LlmMetadata {
        if self.enabled() {
            LlmMetadata::Enabled {
                model: self.config.model.clone(),
                location: self.config.location.clone(),
            }
        } else {
            LlmMetadata::Disabled {
                status: "disabled".to_string(),
            }
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.project_id.trim(),
            self.config.location,
            self.config.model
        )
    }
}

#[async_trait]
impl TextGenerator for LlmService {
    fn enabled(&self) -> bool {
        !self.config.project_id.trim().is_empty() && !self.config.endpoint.trim().is_empty()
    }

    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        locale: Option<&str>,
    ) -> Result<String> {
        if !self.enabled() {
            return Err(CopilotError::LlmDisabled);
        }

        let merged = merge_prompt(system_prompt, user_prompt, locale);
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: &merged }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        let url = self.url();
        debug!("Calling generation API: {}", url);

        let mut builder = self.client.post(&url).json(&request);
        if let Some(token) = non_empty(&self.config.api_key) {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let response = builder
            .send()
            .await
            .map_err(|e| CopilotError::Llm(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CopilotError::Llm(format!(
                "generation API error ({status}): {error_text}"
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| CopilotError::Llm(format!("Failed to parse response: {e}")))?;
        Ok(extract_text(&parsed))
    }
}

/// Text of the first candidate with non-blank parts, or empty
fn extract_text(response: &GenerateResponse) -> String {
    response
        .candidates
        .iter()
        .filter_map(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect::<String>()
        })
        .map(|combined| combined.trim().to_string())
        .find(|combined| !combined.is_empty())
        .unwrap_or_default()
}
