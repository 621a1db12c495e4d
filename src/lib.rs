pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod notify;
pub mod rag;
pub mod search;


pub use config::AppConfig;
pub use errors::*;
