//! Prompts for grounded operations answers

/// Standing instructions for every generation request
pub const SYSTEM_PROMPT: &str = "You are an enterprise IT and operations copilot. \
Use the retrieved tickets, policies, playbooks, and chat transcripts to provide concise, \
actionable incident triage and operational guidance. Cite sources inline using [#]. \
When analyzing incidents, highlight severity, affected services, owners, and next steps. \
Recommend follow-up actions (e.g., create Jira task, notify Slack channel, review policy) when appropriate. \
If context is insufficient, explicitly state what additional data is needed.";

/// Reply used when no generation capability is configured
pub const GENERATION_DISABLED_REPLY: &str = "Answer generation isn't configured yet, so I can't draft a full triage response. \
Use the retrieved context snippets for manual follow-up in the meantime.";

/// Reply used when the conversation has no user message
pub const GREETING_REPLY: &str = "How can I help you today?";

const NO_CONTEXT: &str = "No external documents available.";

/// Build the analyst prompt around the assembled context block
pub fn build_ops_prompt(question: &str, context: &str) -> String {
    let context = if context.trim().is_empty() {
        NO_CONTEXT
    } else {
        context
    };
    format!(
        "Context documents:\n{context}\n\n\
Task: Act as an IT/ops analyst. Provide an answer with citations such as [1], [2], \
highlighting current status, relevant runbooks, and recommended next actions.\n\
User question: {question}"
    )
}

/// Append the locale directive to the system instructions
pub fn with_locale(system_prompt: &str, locale: Option<&str>) -> String {
    match locale.map(str::trim).filter(|l| !l.is_empty()) {
        Some(locale) => format!(
            "{system_prompt}\n\n\
Respond in the locale '{locale}'. When citing sources, keep citation markers as [1], [2]. \
Translate relevant snippets from the context if needed so the final answer is coherent in the requested locale."
        ),
        None => system_prompt.to_string(),
    }
}

/// Single user turn sent to the model
pub fn merge_prompt(system_prompt: &str, user_prompt: &str, locale: Option<&str>) -> String {
    format!(
        "{}\n\nUser request:\n{user_prompt}",
        with_locale(system_prompt, locale)
    )
}
