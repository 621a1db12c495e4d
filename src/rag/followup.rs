//! Operational follow-ups proposed from retrieved evidence

use serde_json::json;
use serde_json::Value;

use crate::config::NotificationsConfig;
use crate::models::ActionKind;
use crate::models::FollowUpAction;
use crate::models::SearchHit;
use crate::rag::text::truncate_chars;

/// Characters of ticket content quoted in an alert
pub const ALERT_EXCERPT_CHARS: usize = 300;

const TICKET_TAG: &str = "ticket";
const ESCALATION_TAGS: [&str; 2] = ["sev", "incident"];
const TICKET_INFO_FIELDS: [&str; 4] = ["severity", "status", "owner", "service"];

/// Proposes follow-up actions. Never executes them.
#[derive(Debug, Clone, Default)]
pub struct FollowUpDeriver {
    channel: Option<String>,
}

impl FollowUpDeriver {
    /// `channel` is `None` when no notification destination is configured
    pub fn new(channel: Option<String>) -> Self {
        Self { channel }
    }

    pub fn from_config(config: &NotificationsConfig) -> Self {
        let channel = config
            .is_configured()
            .then(|| config.default_channel.clone());
        Self::new(channel)
    }

    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    /// Proposes an alert for the first ticket in ranked order when it is an
    /// escalated incident. The query is accepted for rules keyed on intent.
    pub fn derive(&self, _query: &str, hits: &[SearchHit]) -> Vec<FollowUpAction> {
        let Some(channel) = self.channel.as_deref() else {
            return Vec::new();
        };
        let Some(ticket) = hits.iter().find(|hit| hit.source.has_tag(TICKET_TAG)) else {
            return Vec::new();
        };
        let escalated = ticket
            .source
            .tags()
            .iter()
            .any(|tag| ESCALATION_TAGS.contains(&tag.as_str()));
        if !escalated {
            return Vec::new();
        }

        vec![FollowUpAction {
            label: format!("📤 Send to {channel}"),
            action: ActionKind::SlackWebhook,
            payload: alert_payload(channel, ticket),
        }]
    }
}

/// Notification payload: `{channel, message, ticket_info}`
pub fn alert_payload(channel: &str, ticket: &SearchHit) -> Value {
    let title = ticket.source.text("title").unwrap_or("Unknown");
    let content = ticket.source.text("content").unwrap_or("");
    let message = format!(
        "🚨 *Incident Alert:* {title}\n\n{}...",
        truncate_chars(content, ALERT_EXCERPT_CHARS)
    );

    let mut ticket_info = serde_json::Map::new();
    for field in TICKET_INFO_FIELDS {
        let value = ticket.source.get(field).cloned().unwrap_or(Value::Null);
        ticket_info.insert(field.to_string(), value);
    }

    json!({
        "channel": channel,
        "message": message,
        "ticket_info": ticket_info,
    })
}
