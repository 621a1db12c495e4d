//! HTTP server implementation

use axum::http::HeaderValue;
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::AllowOrigin;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::warn;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::config::ServerConfig;
use crate::Result;

/// Router with tracing, compression and optional CORS applied
pub fn build_app(state: AppState, server: &ServerConfig, enable_cors: bool) -> Router {
    let mut app = routes::api_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        app = app.layer(cors_layer(&server.cors_origins));
    }
    app
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed.is_empty() {
        info!("✅ CORS enabled for any origin");
        cors.allow_origin(Any)
    } else {
        info!("✅ CORS enabled for {} origin(s)", allowed.len());
        cors.allow_origin(AllowOrigin::list(allowed))
    }
}

/// Start the API server and run until Ctrl-C
pub async fn serve_api(config: AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting ops copilot API server...");

    let server_config = config.server.clone();
    let state = AppState::from_config(config)?;

    if state.elastic.enabled() {
        match state.elastic.initialize().await {
            Ok(()) => info!("Search backend ready at {}", state.elastic.endpoint()),
            Err(e) => warn!("Search backend initialization failed, will retry lazily: {}", e),
        }
    } else {
        info!("💡 Search endpoint not configured - answers will carry no references");
    }
    if !state.config.llm_enabled() {
        info!("💡 Generation not configured - replies will be a static notice");
    }

    let elastic = state.elastic.clone();
    let app = build_app(state, &server_config, enable_cors);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /health               - Health check");
    info!("  GET  /integrations/status  - Integration status");
    info!("  GET  /metrics              - Request and retrieval counters");
    info!("  POST /chat/completions     - Grounded chat completion");
    info!("  POST /chat/actions         - Execute a follow-up action");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    elastic.shutdown().await;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
