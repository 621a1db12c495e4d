use thiserror::Error;

#[derive(Error, Debug)]
pub enum CopilotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Generation failed: {0}")]
    Llm(String),

    #[error("Generation capability is not configured")]
    LlmDisabled,

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported action '{0}'")]
    UnsupportedAction(String),

    #[error("{0}")]
    Custom(String),
}

impl From<reqwest::Error> for CopilotError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CopilotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_variants_display() {
        let errors = vec![
            CopilotError::Config("config".to_string()),
            CopilotError::Http("http".to_string()),
            CopilotError::Llm("llm".to_string()),
            CopilotError::Notification("slack".to_string()),
            CopilotError::InvalidRequest("bad".to_string()),
            CopilotError::Custom("custom".to_string()),
        ];

        for error in &errors {
            let display = format!("{error}");
            assert!(!display.is_empty());
        }
    }

    #[test]
    fn test_unsupported_action_display() {
        let error = CopilotError::UnsupportedAction("review_ticket".to_string());
        assert_eq!(error.to_string(), "Unsupported action 'review_ticket'");
    }

    #[test]
    fn test_io_error_conversion() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: CopilotError = io_err.into();
        assert!(matches!(err, CopilotError::Io(_)));
    }

    #[test]
    fn test_metrics_error_conversion() {
        let prom_err = prometheus::Error::Msg("duplicate".to_string());
        let err: CopilotError = prom_err.into();
        assert!(matches!(err, CopilotError::Metrics(_)));
        assert_eq!(err.to_string(), "Metrics error: duplicate");
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CopilotError = json_err.into();
        assert!(err.to_string().starts_with("Serialization error"));
    }
}
