//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{IdentityConfig, RegistryConfig};
use super::secret::{secret_string, secret_string_opt};
use crate::domain::errors::RegistryError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into RegistryConfig
/// 4. Applies environment variable overrides (REGISTRY_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use ag_registry::config::loader::load_config;
///
/// let config = load_config("registry.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<RegistryConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(RegistryError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        RegistryError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution, overrides and validation
pub fn parse_config(contents: &str) -> Result<RegistryConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: RegistryConfig = toml::from_str(&contents)
        .map_err(|e| RegistryError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        RegistryError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| RegistryError::Other(format!("invalid substitution pattern: {e}")))?;
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(RegistryError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using REGISTRY_* prefix
///
/// Environment variables follow the pattern: REGISTRY_<SECTION>_<KEY>
/// For example: REGISTRY_STORE_BASE_URL, REGISTRY_STORE_BACKEND
fn apply_env_overrides(config: &mut RegistryConfig) -> Result<()> {
    if let Ok(val) = std::env::var("REGISTRY_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Store overrides
    if let Ok(val) = std::env::var("REGISTRY_STORE_BACKEND") {
        config.store.backend = val.parse().map_err(RegistryError::Configuration)?;
    }
    if let Ok(val) = std::env::var("REGISTRY_STORE_BASE_URL") {
        config.store.base_url = val;
    }
    if let Ok(val) = std::env::var("REGISTRY_STORE_COLLECTION") {
        config.store.collection = val;
    }
    if let Ok(val) = std::env::var("REGISTRY_STORE_PROJECT_ID") {
        config.store.project_id = Some(val);
    }
    if let Ok(val) = std::env::var("REGISTRY_STORE_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.store.timeout_seconds = timeout;
        }
    }

    // Identity overrides; an API key alone is enough to create the section
    if let Ok(val) = std::env::var("REGISTRY_IDENTITY_API_KEY") {
        match config.identity {
            Some(ref mut identity) => identity.api_key = secret_string(val),
            None => {
                config.identity = Some(toml::from_str::<IdentityConfig>(&format!(
                    "api_key = {}",
                    toml::Value::String(val)
                ))?)
            }
        }
    }
    if let Some(ref mut identity) = config.identity {
        if let Ok(val) = std::env::var("REGISTRY_IDENTITY_EMAIL") {
            identity.email = Some(val);
        }
        if let Some(password) = secret_string_opt(std::env::var("REGISTRY_IDENTITY_PASSWORD").ok())
        {
            identity.password = Some(password);
        }
    }

    // Export overrides
    if let Ok(val) = std::env::var("REGISTRY_EXPORT_CSV_PATH") {
        config.export.csv_path = val;
    }
    if let Ok(val) = std::env::var("REGISTRY_EXPORT_PRINT_PATH") {
        config.export.print_path = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("REGISTRY_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("REGISTRY_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
