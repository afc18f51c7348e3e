//! Configuration schema types
//!
//! This module defines the configuration structure that maps to `registry.toml`.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};

/// Record store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// json-server style REST records server, no authentication
    #[default]
    Rest,
    /// Cloud document store, requires an `[identity]` section
    Firestore,
    /// Process-local store, contents are lost on exit
    Memory,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StoreBackend::Rest => "rest",
            StoreBackend::Firestore => "firestore",
            StoreBackend::Memory => "memory",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rest" => Ok(StoreBackend::Rest),
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(format!(
                "Invalid store backend '{other}'. Must be one of: rest, firestore, memory"
            )),
        }
    }
}

/// Main registry configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistryConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Record store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Identity provider (required for the firestore backend)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityConfig>,

    /// Export and print settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RegistryConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.store.validate()?;

        if self.store.backend == StoreBackend::Firestore && self.identity.is_none() {
            return Err(
                "identity configuration is required when store.backend = 'firestore'".to_string(),
            );
        }

        if let Some(ref identity) = self.identity {
            identity.validate()?;
        }

        self.export.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// True if record views require a signed-in, verified user
    pub fn requires_auth(&self) -> bool {
        self.store.backend == StoreBackend::Firestore
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Which backend holds the records
    #[serde(default)]
    pub backend: StoreBackend,

    /// Base URL of the records server or document store API
    #[serde(default = "default_store_base_url")]
    pub base_url: String,

    /// Collection (REST resource path or document collection) holding patients
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Cloud project id (firestore only)
    #[serde(default)]
    pub project_id: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification enabled
    ///
    /// Only disable against a local development server with a self-signed certificate.
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            base_url: default_store_base_url(),
            collection: default_collection(),
            project_id: None,
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
        }
    }
}

impl StoreConfig {
    fn validate(&self) -> Result<(), String> {
        if self.backend != StoreBackend::Memory {
            validate_http_url("store.base_url", &self.base_url)?;
        }

        if self.collection.trim().is_empty() || self.collection.contains('/') {
            return Err(format!(
                "store.collection must be a single non-empty path segment, got '{}'",
                self.collection
            ));
        }

        if self.backend == StoreBackend::Firestore
            && self
                .project_id
                .as_ref()
                .map(|p| p.trim().is_empty())
                .unwrap_or(true)
        {
            return Err("store.project_id is required when store.backend = 'firestore'".to_string());
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err(format!(
                "store.timeout_seconds must be between 1 and 300, got {}",
                self.timeout_seconds
            ));
        }

        Ok(())
    }
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the identity toolkit API
    #[serde(default = "default_identity_base_url")]
    pub base_url: String,

    /// Web API key of the project
    /// Stored securely in memory and automatically zeroized on drop
    pub api_key: SecretString,

    /// Email used for non-interactive sign-in (optional)
    #[serde(default)]
    pub email: Option<String>,

    /// Password used for non-interactive sign-in (optional)
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Document collection holding user roles
    #[serde(default = "default_users_collection")]
    pub users_collection: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl IdentityConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        validate_http_url("identity.base_url", &self.base_url)?;

        if self.api_key.expose_secret().is_empty() {
            return Err("identity.api_key cannot be empty".to_string());
        }

        if self.email.is_some() != self.password.is_some() {
            return Err(
                "identity.email and identity.password must be provided together".to_string(),
            );
        }

        if self.users_collection.trim().is_empty() {
            return Err("identity.users_collection cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Export and print configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Spreadsheet output path
    #[serde(default = "default_csv_path")]
    pub csv_path: String,

    /// Printable document output path
    #[serde(default = "default_print_path")]
    pub print_path: String,

    /// Title of the printable document
    #[serde(default = "default_print_title")]
    pub print_title: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_path: default_csv_path(),
            print_path: default_print_path(),
            print_title: default_print_title(),
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.csv_path.trim().is_empty() {
            return Err("export.csv_path cannot be empty".to_string());
        }
        if self.print_path.trim().is_empty() {
            return Err("export.print_path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }

        Ok(())
    }
}

fn validate_http_url(key: &str, value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err(format!("{key} cannot be empty"));
    }

    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(format!("{key} must start with http:// or https://"));
    }

    url::Url::parse(value).map_err(|e| format!("{key} is not a valid URL: {e}"))?;
    Ok(())
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_store_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_collection() -> String {
    "patients".to_string()
}

fn default_identity_base_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_users_collection() -> String {
    "users".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_csv_path() -> String {
    "patients.csv".to_string()
}

fn default_print_path() -> String {
    "patients.html".to_string()
}

fn default_print_title() -> String {
    "Patient data".to_string()
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn identity() -> IdentityConfig {
        IdentityConfig {
            base_url: default_identity_base_url(),
            api_key: secret_string("key-123".to_string()),
            email: None,
            password: None,
            users_collection: default_users_collection(),
            timeout_seconds: 30,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = RegistryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.store.backend, StoreBackend::Rest);
        assert_eq!(config.store.base_url, "http://localhost:3001");
        assert_eq!(config.store.collection, "patients");
        assert!(!config.requires_auth());
    }

    #[test]
    fn test_application_config_validation() {
        let mut config = ApplicationConfig::default();
        assert!(config.validate().is_ok());

        config.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_config_rejects_bad_url() {
        let mut config = StoreConfig {
            base_url: "localhost:3001".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.base_url = "http://".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_memory_backend_ignores_url() {
        let config = StoreConfig {
            backend: StoreBackend::Memory,
            base_url: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_store_config_rejects_nested_collection() {
        let config = StoreConfig {
            collection: "a/b".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_firestore_requires_project_and_identity() {
        let mut config = RegistryConfig::default();
        config.store.backend = StoreBackend::Firestore;
        config.store.base_url = "https://firestore.googleapis.com/v1".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.contains("project_id"));

        config.store.project_id = Some("ag-registry".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.contains("identity"));

        config.identity = Some(identity());
        assert!(config.validate().is_ok());
        assert!(config.requires_auth());
    }

    #[test]
    fn test_identity_requires_email_and_password_together() {
        let mut config = identity();
        config.email = Some("doc@example.com".to_string());
        assert!(config.validate().is_err());

        config.password = Some(secret_string("pw".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_logging_config_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());

        config.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_backend_parse_and_display() {
        assert_eq!("Firestore".parse::<StoreBackend>().unwrap(), StoreBackend::Firestore);
        assert_eq!(StoreBackend::Memory.to_string(), "memory");
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }
}
