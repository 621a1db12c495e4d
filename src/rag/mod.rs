//! Retrieval-augmented answering for operations questions
//!
//! The pipeline runs per request:
//! - Keyword-driven filter inference
//! - Best-effort search with semantic to lexical fallback
//! - Optional reranking that never drops a hit
//! - Citation and context assembly under a citation cap
//! - Follow-up proposals from the ranked evidence
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use opscopilot::config::AppConfig;
//! use opscopilot::llm::LlmService;
//! use opscopilot::rag::RagService;
//! use opscopilot::search::ElasticClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let elastic = Arc::new(ElasticClient::new(&config.search));
//!     let llm = Arc::new(LlmService::new(config.llm.clone())?);
//!     let service = RagService::from_services(&config, Some(elastic), llm, None);
//!
//!     let references = service.gather_references("Any open SEV1 incidents?", None).await;
//!     println!("{}", references.context);
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod filters;
pub mod followup;
pub mod pipeline;
pub mod prompts;
pub mod reranker;
pub mod text;

pub use context::AssembledContext;
pub use context::ContextAssembler;
pub use filters::FilterInferencer;
pub use filters::FilterRule;
pub use followup::FollowUpDeriver;
pub use pipeline::RagService;
pub use pipeline::References;
pub use reranker::Reranker;
