//! One-shot question and search handlers

use crate::api::AppState;
use crate::cli::output::*;
use crate::models::ChatMessage;
use crate::models::ChatRequest;
use crate::AppConfig;
use crate::Result;

/// Run the full pipeline for one question and print the answer
pub async fn handle_ask(config: AppConfig, question: String, locale: Option<String>) -> Result<()> {
    let state = AppState::from_config(config)?;
    if !state.rag.search_enabled() {
        print_warning("Search endpoint not configured - the answer will carry no references");
    }

    let request = ChatRequest {
        session_id: None,
        messages: vec![ChatMessage::user(question)],
        locale,
    };
    let response = state.rag.complete(&request).await;
    state.elastic.shutdown().await;
    let response = response?;

    println!("💬 {}\n", response.reply.content);
    print_citations(&response.references);
    print_follow_ups(&response.follow_ups);
    Ok(())
}

/// Print ranked hits for a query without generating an answer
pub async fn handle_search(
    config: AppConfig,
    query: String,
    locale: Option<String>,
    size: Option<usize>,
) -> Result<()> {
    let state = AppState::from_config(config)?;
    if !state.rag.search_enabled() {
        print_error("Search endpoint not configured (set search.endpoint)");
        return Ok(());
    }

    print_info(&format!(
        "Searching '{}' in index '{}'",
        query,
        state.rag.gateway().resolve_index(locale.as_deref())
    ));
    let hits = state.rag.retrieve(&query, locale.as_deref(), size).await;
    state.elastic.shutdown().await;

    print_hits(&hits);
    Ok(())
}
