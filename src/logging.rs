//! Logging configuration for the copilot service

use std::path::Path;

use tracing_subscriber::fmt;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

use crate::config::AppConfig;
use crate::errors::CopilotError;
use crate::Result;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

const LOG_FILE_PREFIX: &str = "opscopilot.log";

/// Initialize logging with configuration. `RUST_LOG` overrides the
/// configured level.
pub fn init_logging_with_config(config: &AppConfig) -> Result<()> {
    let level = config.logging.level.as_str();
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},opscopilot={level}")));

    let json = config.logging.json;
    let mut layers: Vec<BoxedLayer> = vec![console_layer(json)];

    if let Some(dir) = config.logging.log_dir.as_deref().filter(|d| !d.is_empty()) {
        let logs_dir = Path::new(dir);
        if !logs_dir.exists() {
            std::fs::create_dir_all(logs_dir)?;
        }
        let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        layers.push(file_layer(json, non_blocking));

        // Keep the writer alive for the life of the process
        std::mem::forget(guard);
    }

    Registry::default()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| CopilotError::Custom(format!("Failed to initialize logging: {e}")))?;

    tracing::info!(
        "Logging initialized with level: {}{}",
        level,
        if json { " (json)" } else { "" }
    );
    if let Some(dir) = &config.logging.log_dir {
        tracing::info!("Log files will be saved to: {}/{}.YYYY-MM-DD", dir, LOG_FILE_PREFIX);
    }

    Ok(())
}

/// Initialize plain console logging for tests and one-shot commands.
/// Safe to call more than once.
pub fn init_simple_logging() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
    Ok(())
}

fn console_layer(json: bool) -> BoxedLayer {
    if json {
        fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .boxed()
    }
}

fn file_layer(json: bool, writer: tracing_appender::non_blocking::NonBlocking) -> BoxedLayer {
    if json {
        fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(writer)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(writer)
            .with_ansi(false)
            .boxed()
    }
}
