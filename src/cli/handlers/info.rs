//! Configuration check handler

use std::path::Path;

use crate::cli::output::*;
use crate::AppConfig;
use crate::Result;

/// Load and validate the configuration, then print a masked summary
pub fn handle_check_config(path: &Path) -> Result<()> {
    println!("🔍 Checking configuration...");

    match AppConfig::load_from(path) {
        Ok(config) => {
            print_success("Configuration loaded successfully!");
            println!();
            print_config(&config);
            println!("\n🎉 Configuration check completed successfully!");
            Ok(())
        }
        Err(e) => {
            print_error(&format!("Configuration error: {e}"));
            println!("\n💡 To fix this:");
            println!("  1. Copy config.example.toml to config.toml");
            println!("  2. Edit config.toml or set COPILOT__<SECTION>__<KEY> variables");
            println!("  3. Run this check again");
            Err(e)
        }
    }
}
