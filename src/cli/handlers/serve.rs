//! API server handlers

use crate::api::serve_api;
use crate::AppConfig;
use crate::Result;

/// Start the server; flags override the `[server]` section
pub async fn handle_serve_api(
    config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
    cors: Option<bool>,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let cors = cors.unwrap_or(config.server.enable_cors);

    println!("🚀 Starting Ops Copilot API Server");
    println!("==================================\n");
    println!("📍 Host: {host}");
    println!("🔌 Port: {port}");
    println!("🌐 CORS: {}", if cors { "Enabled" } else { "Disabled" });
    println!();

    serve_api(config, host, port, cors).await
}
