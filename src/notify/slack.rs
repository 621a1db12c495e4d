//! Slack delivery: Web API first, incoming webhook as fallback

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use serde_json::Map;
use serde_json::Value;
use tracing::info;
use tracing::warn;

use crate::config::non_empty;
use crate::config::NotificationsConfig;
use crate::errors::CopilotError;
use crate::errors::Result;

/// Ticket fields rendered as Slack block fields, in order
const BLOCK_FIELDS: [(&str, &str); 3] = [
    ("severity", "Severity"),
    ("status", "Status"),
    ("owner", "Owner"),
];

/// How an update was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    WebApi,
    Webhook,
    DryRun,
}

/// Slack update parsed from an action payload
#[derive(Debug, Clone, PartialEq)]
pub struct SlackUpdate {
    pub channel: String,
    pub message: String,
    pub ticket_info: Option<Map<String, Value>>,
}

impl SlackUpdate {
    /// Read `channel`, `message` and `ticket_info`, defaulting the channel
    pub fn from_payload(payload: &Map<String, Value>, default_channel: &str) -> Self {
        let channel = payload
            .get("channel")
            .and_then(Value::as_str)
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(default_channel)
            .to_string();
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let ticket_info = payload
            .get("ticket_info")
            .and_then(Value::as_object)
            .cloned();
        Self {
            channel,
            message,
            ticket_info,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct SlackNotifier {
    client: Client,
    api_base: String,
    access_token: Option<String>,
    webhook_url: Option<String>,
    default_channel: String,
}

impl SlackNotifier {
    pub fn new(client: Client, config: &NotificationsConfig) -> Self {
        Self {
            client,
            api_base: config.slack_api_base.trim_end_matches('/').to_string(),
            access_token: non_empty(&config.slack_access_token).map(str::to_string),
            webhook_url: non_empty(&config.slack_webhook_url).map(str::to_string),
            default_channel: config.default_channel.clone(),
        }
    }

    /// Delivery method reported on the integrations status endpoint
    pub fn method(&self) -> &'static str {
        if self.access_token.is_some() {
            "web_api"
        } else if self.webhook_url.is_some() {
            "webhook"
        } else {
            "dry_run"
        }
    }

    /// Post an update. The Web API is tried first when a token is configured;
    /// on failure or without a token the webhook is used; with neither the
    /// update is only logged.
    ///
    /// # Errors
    /// - `CopilotError::Notification` when the webhook call fails
    pub async fn post_update(&self, payload: &Map<String, Value>) -> Result<Delivery> {
        let update = SlackUpdate::from_payload(payload, &self.default_channel);

        if let Some(token) = &self.access_token {
            match self.post_message_api(token, &update).await {
                Ok(()) => return Ok(Delivery::WebApi),
                Err(e) => warn!("Slack Web API failed, falling back to webhook: {}", e),
            }
        }

        let Some(webhook_url) = &self.webhook_url else {
            info!(
                "[Dry-Run] Slack payload: {}",
                serde_json::to_string(payload)?
            );
            return Ok(Delivery::DryRun);
        };

        let response = self
            .client
            .post(webhook_url)
            .json(&json!({ "text": webhook_text(&update)? }))
            .send()
            .await
            .map_err(|e| CopilotError::Notification(format!("Slack webhook call failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        info!("Slack webhook responded {}: {}", status, body);
        if !status.is_success() {
            return Err(CopilotError::Notification(format!(
                "Slack webhook returned {status}: {body}"
            )));
        }
        Ok(Delivery::Webhook)
    }

    async fn post_message_api(&self, token: &str, update: &SlackUpdate) -> Result<()> {
        let mut body = message_blocks(&update.message, update.ticket_info.as_ref());
        body["channel"] = Value::String(update.channel.trim_start_matches('#').to_string());

        let response: PostMessageResponse = self
            .client
            .post(format!("{}/chat.postMessage", self.api_base))
            .header("Authorization", format!("Bearer {token}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| CopilotError::Notification(e.to_string()))?
            .json()
            .await
            .map_err(|e| CopilotError::Notification(format!("Failed to parse response: {e}")))?;

        if !response.ok {
            return Err(CopilotError::Notification(format!(
                "Slack API error: {}",
                response.error.as_deref().unwrap_or("unknown")
            )));
        }
        info!("Slack message posted to {} successfully", update.channel);
        Ok(())
    }
}

/// `chat.postMessage` body: a markdown section plus ticket fields when present
pub fn message_blocks(message: &str, ticket_info: Option<&Map<String, Value>>) -> Value {
    let mut blocks = vec![json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": message },
    })];

    let fields: Vec<Value> = ticket_info
        .map(|info| {
            BLOCK_FIELDS
                .iter()
                .filter_map(|(field, label)| {
                    let value = info.get(*field).filter(|v| is_present(v))?;
                    Some(json!({
                        "type": "mrkdwn",
                        "text": format!("*{label}:*\n{}", plain(value)),
                    }))
                })
                .collect()
        })
        .unwrap_or_default();
    if !fields.is_empty() {
        blocks.push(json!({ "type": "section", "fields": fields }));
    }

    json!({ "blocks": blocks })
}

/// Webhook text: the message, then pretty-printed ticket details
pub fn webhook_text(update: &SlackUpdate) -> Result<String> {
    match &update.ticket_info {
        Some(info) => Ok(format!(
            "{}\n\nDetails: {}",
            update.message,
            serde_json::to_string_pretty(info)?
        )),
        None => Ok(update.message.clone()),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_update_defaults_channel() {
        let update = SlackUpdate::from_payload(&payload(json!({"message": "hi"})), "#ops");
        assert_eq!(update.channel, "#ops");
        assert_eq!(update.message, "hi");
        assert_eq!(update.ticket_info, None);
    }

    #[test]
    fn test_blocks_with_ticket_fields() {
        let info = payload(json!({
            "severity": "SEV1",
            "status": null,
            "owner": "alice",
            "service": "payments"
        }));
        let body = message_blocks("🚨 alert", Some(&info));

        assert_eq!(body["blocks"][0]["text"]["text"], "🚨 alert");
        let fields = body["blocks"][1]["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0]["text"], "*Severity:*\nSEV1");
        assert_eq!(fields[1]["text"], "*Owner:*\nalice");
    }

    #[test]
    fn test_blocks_without_ticket() {
        let body = message_blocks("plain", None);
        assert_eq!(body["blocks"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_webhook_text_includes_details() {
        let update = SlackUpdate::from_payload(
            &payload(json!({"message": "down", "ticket_info": {"severity": "SEV2"}})),
            "#ops",
        );
        let text = webhook_text(&update).unwrap();
        assert!(text.starts_with("down\n\nDetails: {"));
        assert!(text.contains("\"severity\": \"SEV2\""));
    }

    #[tokio::test]
    async fn test_dry_run_without_destination() {
        let notifier = SlackNotifier::new(Client::new(), &NotificationsConfig::default());
        assert_eq!(notifier.method(), "dry_run");
        let delivery = notifier
            .post_update(&payload(json!({"message": "hi"})))
            .await
            .unwrap();
        assert_eq!(delivery, Delivery::DryRun);
    }

    #[test]
    fn test_method_prefers_web_api() {
        let config = NotificationsConfig {
            slack_access_token: Some("xoxb-1".to_string()),
            slack_webhook_url: Some("https://hooks.slack.com/x".to_string()),
            ..Default::default()
        };
        assert_eq!(SlackNotifier::new(Client::new(), &config).method(), "web_api");
    }
}
