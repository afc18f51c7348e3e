//! Configuration management for the registry.
//!
//! # Overview
//!
//! The registry reads a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `REGISTRY_<SECTION>_<KEY>` environment overrides
//! - Default values for every optional setting
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level
//! - [`StoreConfig`] - record store backend and connection
//! - [`IdentityConfig`] - identity provider (firestore backend only)
//! - [`ExportConfig`] - spreadsheet and print output
//! - [`LoggingConfig`] - local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [store]
//! backend = "firestore"
//! base_url = "https://firestore.googleapis.com/v1"
//! project_id = "ag-registry"
//!
//! [identity]
//! api_key = "${REGISTRY_API_KEY}"
//!
//! [export]
//! csv_path = "patients.csv"
//! ```
//!
//! ```rust,no_run
//! use ag_registry::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("registry.toml")?;
//! println!("Store: {} at {}", config.store.backend, config.store.base_url);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, ExportConfig, IdentityConfig, LoggingConfig, RegistryConfig, StoreBackend,
    StoreConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
