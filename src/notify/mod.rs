//! Execution of follow-up actions the user accepted

pub mod jira;
pub mod slack;

use std::time::Duration;

use reqwest::Client;
use tracing::info;

pub use jira::JiraClient;
pub use slack::Delivery;
pub use slack::SlackNotifier;

use crate::config::NotificationsConfig;
use crate::errors::CopilotError;
use crate::errors::Result;
use crate::models::ActionKind;
use crate::models::ActionRequest;
use crate::models::ActionResponse;

/// Routes an accepted action to its integration
pub struct ActionExecutor {
    slack: SlackNotifier,
    jira: JiraClient,
}

impl ActionExecutor {
    /// # Errors
    /// - HTTP client build errors
    pub fn new(config: &NotificationsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| CopilotError::Http(e.to_string()))?;
        Ok(Self {
            slack: SlackNotifier::new(client.clone(), config),
            jira: JiraClient::new(client, config),
        })
    }

    pub fn slack(&self) -> &SlackNotifier {
        &self.slack
    }

    pub fn jira(&self) -> &JiraClient {
        &self.jira
    }

    /// Execute one action
    ///
    /// # Errors
    /// - `CopilotError::UnsupportedAction` for review kinds, which have no executor
    /// - `CopilotError::Notification` when delivery fails
    pub async fn execute(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let payload_keys: Vec<&str> = request.payload.keys().map(String::as_str).collect();
        info!(action = %request.action, ?payload_keys, "action_request");

        match request.action {
            ActionKind::SlackWebhook => {
                let delivery = self.slack.post_update(&request.payload).await?;
                info!(?delivery, "slack_webhook_completed");
                Ok(ActionResponse {
                    status: "ok".to_string(),
                    message: "Slack update sent successfully".to_string(),
                })
            }
            ActionKind::JiraWebhook => {
                self.jira.call_webhook(&request.payload).await?;
                info!("jira_webhook_completed");
                Ok(ActionResponse {
                    status: "ok".to_string(),
                    message: "Jira webhook triggered successfully".to_string(),
                })
            }
            ActionKind::ReviewTicket | ActionKind::ManualReview => {
                Err(CopilotError::UnsupportedAction(request.action.to_string()))
            }
        }
    }
}
