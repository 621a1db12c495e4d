//! Complete chat pipeline: Infer filters -> Search -> Rerank -> Assemble -> Generate

use std::sync::Arc;

use tracing::debug;
use tracing::error;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::CopilotError;
use crate::errors::Result;
use crate::llm::TextGenerator;
use crate::metrics::Metrics;
use crate::models::ChatMessage;
use crate::models::ChatRequest;
use crate::models::ChatResponse;
use crate::models::Citation;
use crate::models::SearchHit;
use crate::rag::prompts::build_ops_prompt;
use crate::rag::prompts::GENERATION_DISABLED_REPLY;
use crate::rag::prompts::GREETING_REPLY;
use crate::rag::prompts::SYSTEM_PROMPT;
use crate::rag::ContextAssembler;
use crate::rag::FilterInferencer;
use crate::rag::FollowUpDeriver;
use crate::rag::Reranker;
use crate::search::SearchBackend;
use crate::search::SearchGateway;

/// Grounding gathered for one question
#[derive(Debug, Clone, Default)]
pub struct References {
    pub citations: Vec<Citation>,
    pub context: String,
    /// Every ranked hit, including those past the citation cap
    pub hits: Vec<SearchHit>,
}

/// Complete chat service
pub struct RagService {
    filter_inferencer: FilterInferencer,
    gateway: SearchGateway,
    reranker: Reranker,
    context_assembler: ContextAssembler,
    follow_ups: FollowUpDeriver,
    generator: Arc<dyn TextGenerator>,
}

impl RagService {
    /// Create from existing services. `backend` is `None` when search is disabled.
    #[must_use]
    pub fn from_services(
        config: &AppConfig,
        backend: Option<Arc<dyn SearchBackend>>,
        generator: Arc<dyn TextGenerator>,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        let mut context_assembler = ContextAssembler::new(config.search.max_context_citations);
        if let Some(metrics) = metrics {
            context_assembler = context_assembler.with_metrics(metrics);
        }

        Self {
            filter_inferencer: FilterInferencer::default(),
            gateway: SearchGateway::new(backend.clone(), &config.search),
            reranker: Reranker::new(backend, &config.search),
            context_assembler,
            follow_ups: FollowUpDeriver::from_config(&config.notifications),
            generator,
        }
    }

    /// Infer filters, search and rerank. Empty when search is disabled.
    pub async fn retrieve(
        &self,
        query: &str,
        locale: Option<&str>,
        size: Option<usize>,
    ) -> Vec<SearchHit> {
        if !self.gateway.enabled() {
            return Vec::new();
        }

        let filters = self.filter_inferencer.infer(query);
        debug!("Inferred {} filter field(s)", filters.len());

        let hits = self
            .gateway
            .search(query, Some(&filters), locale, size)
            .await;
        self.reranker.rerank(query, hits).await
    }

    /// Retrieve and assemble citations plus the grounding context
    pub async fn gather_references(&self, query: &str, locale: Option<&str>) -> References {
        let hits = self.retrieve(query, locale, None).await;
        let assembled = self.context_assembler.assemble(&hits);
        References {
            citations: assembled.citations,
            context: assembled.context,
            hits,
        }
    }

    /// Generate a grounded answer. Returns a fixed notice when generation is
    /// not configured.
    ///
    /// # Errors
    /// - `CopilotError::Llm` when the generation call fails
    pub async fn generate_answer(
        &self,
        question: &str,
        context: &str,
        locale: Option<&str>,
    ) -> Result<String> {
        if !self.generator.enabled() {
            return Ok(GENERATION_DISABLED_REPLY.to_string());
        }

        let prompt = build_ops_prompt(question, context);
        self.generator
            .generate(SYSTEM_PROMPT, &prompt, locale)
            .await
            .map_err(|e| {
                error!("Answer generation failed: {}", e);
                match e {
                    CopilotError::Llm(_) => e,
                    other => CopilotError::Llm(other.to_string()),
                }
            })
    }

    /// Answer the last user message of a conversation
    ///
    /// # Errors
    /// - `CopilotError::Llm` when the generation call fails
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let session_id = request
            .session_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map_or_else(new_session_id, str::to_string);
        let locale = request.locale.as_deref();

        info!(
            session_id = %session_id,
            message_count = request.messages.len(),
            locale = locale.unwrap_or("default"),
            "chat_completion_request"
        );

        let Some(user_message) = request.last_user_message() else {
            return Ok(ChatResponse {
                session_id,
                reply: ChatMessage::assistant(GREETING_REPLY),
                sources: Vec::new(),
                references: Vec::new(),
                follow_ups: Vec::new(),
            });
        };
        let question = user_message.content.as_str();

        let references = self.gather_references(question, locale).await;
        let answer = self
            .generate_answer(question, &references.context, locale)
            .await?;

        let follow_ups = if references.citations.is_empty() {
            Vec::new()
        } else {
            self.follow_ups.derive(question, &references.hits)
        };
        let sources = references
            .citations
            .iter()
            .map(|c| c.source_label().to_string())
            .collect();

        info!(
            session_id = %session_id,
            reference_count = references.citations.len(),
            follow_up_count = follow_ups.len(),
            "chat_completion_success"
        );

        Ok(ChatResponse {
            session_id,
            reply: ChatMessage::assistant(answer),
            sources,
            references: references.citations,
            follow_ups,
        })
    }

    /// Whether retrieval will reach a search backend
    pub fn search_enabled(&self) -> bool {
        self.gateway.enabled()
    }

    /// Get gateway reference
    #[must_use]
    pub const fn gateway(&self) -> &SearchGateway {
        &self.gateway
    }
}

fn new_session_id() -> String {
    format!("session-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_format() {
        let id = new_session_id();
        assert!(id.starts_with("session-"));
        assert!(Uuid::parse_str(&id["session-".len()..]).is_ok());
    }
}
