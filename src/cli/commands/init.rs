//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::context::exit;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "registry.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing registry configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit::CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set store.backend to 'rest', 'firestore' or 'memory'");
                println!("  3. For firestore, create a .env file with:");
                println!("     - REGISTRY_IDENTITY_API_KEY");
                println!("     - REGISTRY_IDENTITY_EMAIL and REGISTRY_IDENTITY_PASSWORD (optional)");
                println!("  4. Validate configuration: registry validate-config");
                println!("  5. List patients: registry list");
                println!();
                Ok(exit::OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(exit::FAILURE)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Patient Registry Configuration File

[application]
log_level = "info"

[store]
backend = "rest"  # rest | firestore | memory
base_url = "http://localhost:3001"
collection = "patients"

[export]
csv_path = "patients.csv"
print_path = "patients.html"
print_title = "Patient data"

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Patient Registry Configuration File
#
# This file contains all configuration options with examples and explanations.
#
# Three record store backends are supported:
#   - rest:      a json-server style records server (no sign-in)
#   - firestore: a cloud document store (sign-in with a verified email required)
#   - memory:    process-local records, lost on exit
#
# Any value can reference an environment variable as ${VAR_NAME}, and every
# setting can be overridden with REGISTRY_<SECTION>_<KEY>.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Record Store
# ============================================================================
[store]
# Backend: rest | firestore | memory
backend = "rest"

# Base URL of the records server
# For firestore use "https://firestore.googleapis.com/v1"
base_url = "http://localhost:3001"

# Collection holding the patient records (a single path segment)
collection = "patients"

# Cloud project id (firestore only)
# project_id = "ag-registry"

# Request timeout in seconds (1-300)
timeout_seconds = 30

# TLS certificate verification
tls_verify = true

# ============================================================================
# Identity Provider (required for firestore)
# ============================================================================
# [identity]
# base_url = "https://identitytoolkit.googleapis.com/v1"
#
# # Web API key of the project (use environment variable)
# api_key = "${REGISTRY_IDENTITY_API_KEY}"
#
# # Account used by one-shot commands such as 'registry list'
# # email = "nurse@example.com"
# # password = "${REGISTRY_IDENTITY_PASSWORD}"
#
# # Collection holding the user role documents
# users_collection = "users"
#
# timeout_seconds = 30

# ============================================================================
# Export and Print
# ============================================================================
[export]
# Spreadsheet (CSV) output path
csv_path = "patients.csv"

# Printable HTML page output path
print_path = "patients.html"

# Heading of the printable page
print_title = "Patient data"

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable local JSON file logging
local_enabled = false

# Local log directory
local_path = "logs"

# Log rotation (daily, hourly, never)
local_rotation = "daily"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, StoreBackend};
    use tempfile::TempDir;

    #[test]
    fn test_generate_minimal_config_parses() {
        let config = parse_config(&InitArgs::generate_minimal_config()).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Rest);
        assert_eq!(config.store.collection, "patients");
        assert!(config.identity.is_none());
    }

    #[test]
    fn test_generate_config_with_examples_parses() {
        let content = InitArgs::generate_config_with_examples();
        assert!(content.contains("# Patient Registry Configuration File"));
        assert!(content.contains("users_collection"));
        let config = parse_config(&content).unwrap();
        assert_eq!(config.export.print_title, "Patient data");
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("registry.toml");
        fs::write(&output, "# existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), exit::CONFIG);
        assert_eq!(fs::read_to_string(&output).unwrap(), "# existing");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().await.unwrap(), exit::OK);
        assert!(fs::read_to_string(&output).unwrap().contains("[store]"));
    }
}
