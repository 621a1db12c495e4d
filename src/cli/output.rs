//! CLI output formatting utilities

use crate::config::non_empty;
use crate::config::AppConfig;
use crate::models::Citation;
use crate::models::FollowUpAction;
use crate::models::SearchHit;

/// Safely truncate a string at character boundary (not byte boundary)
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Keep the first four characters of a secret
#[must_use]
pub fn mask_secret(secret: Option<&str>) -> String {
    match secret.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) if s.chars().count() > 8 => {
            format!("{}***", s.chars().take(4).collect::<String>())
        }
        Some(_) => "***".to_string(),
        None => "(not set)".to_string(),
    }
}

/// Strip credentials from a URL, keeping scheme, host and port
#[must_use]
pub fn mask_url(url: &str) -> String {
    if url.trim().is_empty() {
        return "(not set)".to_string();
    }
    match url::Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => match parsed.port() {
                Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
                None => format!("{}://{}", parsed.scheme(), host),
            },
            None => "***masked***".to_string(),
        },
        Err(_) => "***invalid***".to_string(),
    }
}

/// Print numbered citations
pub fn print_citations(citations: &[Citation]) {
    if citations.is_empty() {
        println!("📚 No references found");
        return;
    }
    println!("📚 References ({}):", citations.len());
    for (idx, citation) in citations.iter().enumerate() {
        let score = citation
            .score
            .map_or_else(|| "-".to_string(), |s| format!("{s:.3}"));
        println!(
            "  [{}] {} (score: {}) - {}",
            idx + 1,
            citation.title,
            score,
            citation.source_label()
        );
        if !citation.metadata.is_empty() {
            let metadata = citation
                .metadata
                .iter()
                .map(|(label, value)| format!("{label}: {value}"))
                .collect::<Vec<_>>()
                .join("; ");
            println!("      {metadata}");
        }
    }
}

/// Print proposed follow-up actions
pub fn print_follow_ups(follow_ups: &[FollowUpAction]) {
    if follow_ups.is_empty() {
        return;
    }
    println!("\n🔔 Suggested follow-ups:");
    for action in follow_ups {
        println!("  - {} ({})", action.label, action.action);
    }
}

/// Print ranked search hits
pub fn print_hits(hits: &[SearchHit]) {
    println!("Found {} hits:", hits.len());
    for (idx, hit) in hits.iter().enumerate() {
        let title = hit
            .source
            .text("title")
            .unwrap_or_else(|| hit.rerank_text());
        let score = hit
            .display_score()
            .map_or_else(|| "-".to_string(), |s| format!("{s:.3}"));
        println!(
            "  {}. [{}] {} | {} | score: {}",
            idx + 1,
            hit.index_name(),
            hit.id.as_deref().unwrap_or("N/A"),
            truncate_str(title, 80),
            score
        );
    }
}

/// Print configuration with secrets masked
pub fn print_config(config: &AppConfig) {
    println!("📋 Ops Copilot Configuration:");
    println!();

    println!("🌐 Server:");
    println!("  Bind: {}:{}", config.server.host, config.server.port);
    println!("  CORS: {}", config.server.enable_cors);
    println!("  CORS origins: {:?}", config.server.cors_origins);
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  JSON: {}", config.logging.json);
    println!(
        "  Log dir: {}",
        config.logging.log_dir.as_deref().unwrap_or("(console only)")
    );
    println!();

    println!("🔎 Search:");
    println!("  Endpoint: {}", mask_url(config.search_endpoint()));
    println!("  API key: {}", mask_secret(non_empty(&config.search.api_key)));
    println!("  Default index: {}", config.default_index());
    println!("  Locale overrides: {:?}", config.search.locale_index_overrides);
    println!("  Semantic inference: {}", config.search.semantic_inference_id);
    println!(
        "  Rerank inference: {}",
        if config.search.rerank_inference_id.is_empty() {
            "(disabled)"
        } else {
            config.search.rerank_inference_id.as_str()
        }
    );
    println!("  Result size: {}", config.search.result_size);
    println!("  Max citations: {}", config.search.max_context_citations);
    println!();

    println!("🤖 LLM:");
    println!("  Enabled: {}", config.llm_enabled());
    println!("  Endpoint: {}", mask_url(&config.llm.endpoint));
    println!("  Model: {} ({})", config.llm.model, config.llm.location);
    println!("  Key: {}", mask_secret(non_empty(&config.llm.api_key)));
    println!();

    println!("🔔 Notifications:");
    println!("  Configured: {}", config.notifications_configured());
    println!("  Default channel: {}", config.default_channel());
    println!(
        "  Slack webhook: {}",
        mask_url(non_empty(&config.notifications.slack_webhook_url).unwrap_or_default())
    );
    println!(
        "  Slack token: {}",
        mask_secret(non_empty(&config.notifications.slack_access_token))
    );
    println!(
        "  Jira webhook: {}",
        mask_url(non_empty(&config.notifications.jira_webhook_url).unwrap_or_default())
    );
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    println!("❌ {msg}");
}
