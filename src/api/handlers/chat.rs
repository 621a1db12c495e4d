/// Chat and action handlers
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::types::validate_chat_request;
use crate::api::types::ApiError;
use crate::errors::CopilotError;
use crate::models::ActionRequest;
use crate::models::ActionResponse;
use crate::models::ChatRequest;
use crate::models::ChatResponse;

/// Chat completion (POST /chat/completions)
pub async fn chat_completion(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    info!("POST /chat/completions ({} messages)", request.messages.len());
    validate_chat_request(&request)?;

    let response = state.rag.complete(&request).await?;
    Ok(Json(response))
}

/// Execute an accepted follow-up (POST /chat/actions)
pub async fn execute_action(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionResponse>, ApiError> {
    info!("POST /chat/actions: {}", request.action);

    let action = request.action;
    let response = state.executor.execute(&request).await.map_err(|e| match e {
        CopilotError::Notification(reason) => {
            CopilotError::Notification(format!("Action {action} failed: {reason}"))
        }
        other => other,
    })?;
    Ok(Json(response))
}
