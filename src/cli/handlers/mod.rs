//! CLI command handlers module
//!
//! - serve: API server
//! - ask: one-shot questions and raw search
//! - info: configuration check

pub mod ask;
pub mod info;
pub mod serve;

pub use ask::*;
pub use info::*;
pub use serve::*;
