//! API route definitions

use std::sync::Arc;
use std::time::Instant;

use axum::extract::MatchedPath;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware;
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};
use crate::metrics::Metrics;

/// Create the API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health and status
        .route("/health", get(handlers::health))
        .route("/integrations/status", get(handlers::integrations_status))
        .route("/metrics", get(handlers::metrics))
        // Chat endpoints
        .route("/chat/completions", post(handlers::chat_completion))
        .route("/chat/actions", post(handlers::execute_action))
        .route_layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            record_latency,
        ))
        .with_state(state)
}

/// Record request count and latency per matched route
pub async fn record_latency(
    State(metrics): State<Arc<Metrics>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_string(), |p| p.as_str().to_string());

    let started = Instant::now();
    let response = next.run(request).await;
    metrics.record_request(&method, &path, response.status().as_u16(), started.elapsed());
    response
}
