//! Jira automation webhook

use reqwest::Client;
use serde_json::Map;
use serde_json::Value;
use tracing::info;

use crate::config::non_empty;
use crate::config::NotificationsConfig;
use crate::errors::CopilotError;
use crate::errors::Result;

pub struct JiraClient {
    client: Client,
    webhook_url: Option<String>,
}

impl JiraClient {
    pub fn new(client: Client, config: &NotificationsConfig) -> Self {
        Self {
            client,
            webhook_url: non_empty(&config.jira_webhook_url).map(str::to_string),
        }
    }

    pub fn configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Forward `payload` to the webhook, or log it when none is configured.
    /// Returns whether a request was sent.
    ///
    /// # Errors
    /// - `CopilotError::Notification` on transport failure or a non-2xx reply
    pub async fn call_webhook(&self, payload: &Map<String, Value>) -> Result<bool> {
        let Some(url) = &self.webhook_url else {
            info!("[Dry-Run] Jira webhook payload: {}", serde_json::to_string(payload)?);
            return Ok(false);
        };

        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| CopilotError::Notification(format!("Jira webhook call failed: {e}")))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        info!("Jira webhook responded {}: {}", status, body);
        if status.is_success() {
            Ok(true)
        } else {
            Err(CopilotError::Notification(format!(
                "Jira webhook returned {status}: {body}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_without_url() {
        let jira = JiraClient::new(Client::new(), &NotificationsConfig::default());
        assert!(!jira.configured());
        let sent = jira.call_webhook(&Map::new()).await.unwrap();
        assert!(!sent);
    }

    #[tokio::test]
    async fn test_unreachable_webhook_errors() {
        let config = NotificationsConfig {
            jira_webhook_url: Some("http://127.0.0.1:9/hook".to_string()),
            ..Default::default()
        };
        let jira = JiraClient::new(Client::new(), &config);
        let err = jira.call_webhook(&Map::new()).await.unwrap_err();
        assert!(matches!(err, CopilotError::Notification(_)));
    }
}
