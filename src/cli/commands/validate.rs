//! Validate config command implementation
//!
//! This module implements the `validate-config` command for checking the
//! registry configuration file without contacting any server.

use crate::cli::context::exit;
use crate::config::{load_config, RegistryConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                println!("Configuration Summary:");
                for line in summary(&config) {
                    println!("  {line}");
                }
                println!();
                Ok(exit::OK)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(exit::CONFIG)
            }
        }
    }
}

/// Human-readable summary lines; secrets are never included
fn summary(config: &RegistryConfig) -> Vec<String> {
    let mut lines = vec![
        format!("Log Level: {}", config.application.log_level),
        format!("Store Backend: {}", config.store.backend),
    ];

    if config.store.backend != crate::config::StoreBackend::Memory {
        lines.push(format!("Store URL: {}", config.store.base_url));
    }
    lines.push(format!("Collection: {}", config.store.collection));
    if let Some(ref project) = config.store.project_id {
        lines.push(format!("Project: {project}"));
    }

    match config.identity {
        Some(ref identity) => {
            lines.push(format!("Identity Provider: {}", identity.base_url));
            lines.push(format!("Roles Collection: {}", identity.users_collection));
            lines.push(format!(
                "Configured Account: {}",
                identity.email.as_deref().unwrap_or("(none)")
            ));
        }
        None => lines.push("Identity Provider: (none)".to_string()),
    }

    lines.push(format!("Spreadsheet Export: {}", config.export.csv_path));
    lines.push(format!("Print Export: {}", config.export.print_path));
    if config.logging.local_enabled {
        lines.push(format!(
            "File Logging: {} ({})",
            config.logging.local_path, config.logging.local_rotation
        ));
    }
    lines
}
