//! Answer generation

pub mod client;

use async_trait::async_trait;

pub use client::LlmMetadata;
pub use client::LlmService;

use crate::errors::Result;

/// Capability that turns instructions plus a grounded prompt into an answer
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Whether generation is configured at all
    fn enabled(&self) -> bool;

    /// Generate an answer. `locale` asks for a reply in that locale.
    async fn generate(&self, system_prompt: &str, user_prompt: &str, locale: Option<&str>)
        -> Result<String>;
}
