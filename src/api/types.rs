//! API request and response types

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::errors::CopilotError;
use crate::llm::LlmMetadata;
use crate::models::ChatRequest;
use crate::models::SUPPORTED_LOCALES;
use crate::search::elastic::ClusterHealth;

pub const MAX_MESSAGES: usize = 50;
pub const MAX_MESSAGE_CHARS: usize = 10_000;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Search cluster state on the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SearchStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ClusterHealth> for SearchStatus {
    fn from(health: ClusterHealth) -> Self {
        Self {
            status: health.status,
            cluster_name: health.cluster_name,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SlackStatus {
    pub method: String,
}

/// Integrations status response
#[derive(Debug, Clone, Serialize)]
pub struct IntegrationsStatus {
    pub elastic: SearchStatus,
    pub llm: LlmMetadata,
    pub slack: SlackStatus,
}

/// Error returned by handlers, mapped to a status code
#[derive(Debug)]
pub struct ApiError(pub CopilotError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CopilotError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CopilotError::UnsupportedAction(_) => StatusCode::BAD_REQUEST,
            CopilotError::Llm(_) | CopilotError::Notification(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CopilotError> for ApiError {
    fn from(err: CopilotError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Unexpected error: {}", self.0);
            "An unexpected error occurred while processing your request.".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

/// Check message count, message length and locale
///
/// # Errors
/// - `CopilotError::InvalidRequest` naming the first violated rule
pub fn validate_chat_request(request: &ChatRequest) -> Result<(), CopilotError> {
    if request.messages.is_empty() || request.messages.len() > MAX_MESSAGES {
        return Err(CopilotError::InvalidRequest(format!(
            "messages must contain between 1 and {MAX_MESSAGES} entries"
        )));
    }
    for message in &request.messages {
        if message.content.trim().is_empty() {
            return Err(CopilotError::InvalidRequest(
                "Message content cannot be empty".to_string(),
            ));
        }
        if message.content.chars().count() > MAX_MESSAGE_CHARS {
            return Err(CopilotError::InvalidRequest(format!(
                "Message content exceeds {MAX_MESSAGE_CHARS} characters"
            )));
        }
    }
    if let Some(locale) = request.locale.as_deref() {
        if !SUPPORTED_LOCALES.contains(&locale) {
            return Err(CopilotError::InvalidRequest(format!(
                "Unsupported locale '{locale}', expected one of {}",
                SUPPORTED_LOCALES.join(", ")
            )));
        }
    }
    Ok(())
}
