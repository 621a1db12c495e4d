/// Status and metrics handlers
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use tracing::warn;

use super::AppState;
use crate::api::types::ApiError;
use crate::api::types::IntegrationsStatus;
use crate::api::types::SearchStatus;
use crate::api::types::SlackStatus;
use crate::metrics::EXPOSITION_CONTENT_TYPE;

/// Integration health (GET /integrations/status)
pub async fn integrations_status(State(state): State<AppState>) -> Json<IntegrationsStatus> {
    let elastic = match state.elastic.health().await {
        Ok(health) => SearchStatus::from(health),
        Err(e) => {
            warn!("Elasticsearch health check failed: {}", e);
            SearchStatus {
                status: "unavailable".to_string(),
                cluster_name: None,
                error: Some(e.to_string()),
            }
        }
    };

    Json(IntegrationsStatus {
        elastic,
        llm: state.llm.metadata(),
        slack: SlackStatus {
            method: state.executor.slack().method().to_string(),
        },
    })
}

/// Prometheus exposition (GET /metrics)
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.metrics.encode()?;
    Ok(([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], body))
}
