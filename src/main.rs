use clap::Parser;
use opscopilot::cli::handle_ask;
use opscopilot::cli::handle_check_config;
use opscopilot::cli::handle_search;
use opscopilot::cli::handle_serve_api;
use opscopilot::cli::Cli;
use opscopilot::cli::Commands;
use opscopilot::logging::init_logging_with_config;
use opscopilot::logging::init_simple_logging;
use opscopilot::AppConfig;
use opscopilot::Result;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // check-config reports load errors itself
    if matches!(cli.command, Commands::CheckConfig) {
        init_simple_logging()?;
        return handle_check_config(&cli.config);
    }

    let mut config = AppConfig::load_from(&cli.config)?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    init_logging_with_config(&config)?;
    debug!("Configuration loaded from {}", cli.config.display());

    match cli.command {
        Commands::Serve { host, port, cors } => handle_serve_api(config, host, port, cors).await,
        Commands::Ask { question, locale } => handle_ask(config, question, locale).await,
        Commands::Search {
            query,
            locale,
            size,
        } => handle_search(config, query, locale, size).await,
        Commands::CheckConfig => handle_check_config(&cli.config),
    }
}
