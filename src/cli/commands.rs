//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "opscopilot")]
#[command(about = "Retrieval-grounded IT and operations copilot")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file, overlaid with COPILOT__* environment variables
    #[arg(short, long, global = true, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind (default: server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (default: server.port)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable or disable CORS (default: server.enable_cors)
        #[arg(long)]
        cors: Option<bool>,
    },
    /// Answer one question through the full pipeline
    Ask {
        /// The question to ask
        question: String,
        /// Reply locale, e.g. fr-FR
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// Show ranked search hits for a query without generating an answer
    Search {
        /// Search query
        query: String,
        /// Locale used to pick the index
        #[arg(short, long)]
        locale: Option<String>,
        /// Maximum number of hits (default: search.result_size)
        #[arg(short, long)]
        size: Option<usize>,
    },
    /// Load and validate the configuration
    CheckConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_locale() {
        let cli = Cli::try_parse_from(["opscopilot", "ask", "Any SEV1?", "--locale", "es-ES"])
            .unwrap();
        match cli.command {
            Commands::Ask { question, locale } => {
                assert_eq!(question, "Any SEV1?");
                assert_eq!(locale.as_deref(), Some("es-ES"));
            }
            _ => panic!("expected ask"),
        }
        assert_eq!(cli.config, PathBuf::from("config.toml"));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "opscopilot",
            "serve",
            "--port",
            "9000",
            "--cors",
            "false",
            "--verbose",
            "--config",
            "prod.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("prod.toml"));
        match cli.command {
            Commands::Serve { host, port, cors } => {
                assert_eq!(host, None);
                assert_eq!(port, Some(9000));
                assert_eq!(cors, Some(false));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_check_config() {
        let cli = Cli::try_parse_from(["opscopilot", "check-config"]).unwrap();
        assert!(matches!(cli.command, Commands::CheckConfig));
    }
}
