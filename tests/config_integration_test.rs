//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables hold ENV_MUTEX to avoid
//! interference between tests.

use ag_registry::config::{load_config, StoreBackend};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("REGISTRY_APPLICATION_LOG_LEVEL");
    std::env::remove_var("REGISTRY_STORE_BACKEND");
    std::env::remove_var("REGISTRY_STORE_BASE_URL");
    std::env::remove_var("REGISTRY_STORE_PROJECT_ID");
    std::env::remove_var("REGISTRY_IDENTITY_API_KEY");
    std::env::remove_var("REGISTRY_IDENTITY_EMAIL");
    std::env::remove_var("REGISTRY_IDENTITY_PASSWORD");
    std::env::remove_var("REGISTRY_EXPORT_CSV_PATH");
    std::env::remove_var("TEST_REGISTRY_API_KEY");
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[application]
log_level = "debug"

[store]
backend = "firestore"
base_url = "https://firestore.googleapis.com/v1"
collection = "patients"
project_id = "ag-registry"
timeout_seconds = 10

[identity]
api_key = "test-api-key"
email = "nurse@example.com"
password = "nurse-password"
users_collection = "staff"

[export]
csv_path = "out/patients.csv"
print_path = "out/patients.html"
print_title = "Ward 3"

[logging]
local_enabled = true
local_path = "/tmp/registry"
local_rotation = "hourly"
"#,
    );

    let config = load_config(temp_file.path()).unwrap();
    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.store.backend, StoreBackend::Firestore);
    assert_eq!(config.store.project_id.as_deref(), Some("ag-registry"));
    assert_eq!(config.store.timeout_seconds, 10);
    assert!(config.requires_auth());

    let identity = config.identity.as_ref().unwrap();
    assert_eq!(identity.api_key.expose_secret().as_ref(), "test-api-key");
    assert_eq!(identity.email.as_deref(), Some("nurse@example.com"));
    assert_eq!(identity.users_collection, "staff");

    assert_eq!(config.export.print_title, "Ward 3");
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config("[store]\nbackend = \"rest\"\n");
    let config = load_config(temp_file.path()).unwrap();

    assert_eq!(config.store.base_url, "http://localhost:3001");
    assert_eq!(config.store.collection, "patients");
    assert_eq!(config.export.csv_path, "patients.csv");
    assert_eq!(config.export.print_path, "patients.html");
    assert!(config.identity.is_none());
    assert!(!config.requires_auth());
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("TEST_REGISTRY_API_KEY", "substituted-key");

    let temp_file = write_config(
        r#"
[store]
backend = "firestore"
base_url = "https://firestore.googleapis.com/v1"
project_id = "demo"

[identity]
api_key = "${TEST_REGISTRY_API_KEY}"
"#,
    );

    let config = load_config(temp_file.path()).unwrap();
    assert_eq!(
        config.identity.unwrap().api_key.expose_secret().as_ref(),
        "substituted-key"
    );

    cleanup_env_vars();
}

#[test]
fn test_env_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();
    std::env::set_var("REGISTRY_STORE_BACKEND", "firestore");
    std::env::set_var("REGISTRY_STORE_BASE_URL", "https://firestore.googleapis.com/v1");
    std::env::set_var("REGISTRY_STORE_PROJECT_ID", "from-env");
    std::env::set_var("REGISTRY_IDENTITY_API_KEY", "env-key");
    std::env::set_var("REGISTRY_IDENTITY_EMAIL", "admin@example.com");
    std::env::set_var("REGISTRY_IDENTITY_PASSWORD", "env-password");
    std::env::set_var("REGISTRY_EXPORT_CSV_PATH", "env.csv");

    let temp_file = write_config("[application]\nlog_level = \"info\"\n");
    let result = load_config(temp_file.path());
    cleanup_env_vars();

    let config = result.unwrap();
    assert_eq!(config.store.backend, StoreBackend::Firestore);
    assert_eq!(config.store.project_id.as_deref(), Some("from-env"));
    let identity = config.identity.unwrap();
    assert_eq!(identity.api_key.expose_secret().as_ref(), "env-key");
    assert_eq!(identity.email.as_deref(), Some("admin@example.com"));
    assert_eq!(identity.password.unwrap().expose_secret().as_ref(), "env-password");
    assert_eq!(config.export.csv_path, "env.csv");
}

#[test]
fn test_firestore_requires_identity() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    let temp_file = write_config(
        r#"
[store]
backend = "firestore"
base_url = "https://firestore.googleapis.com/v1"
project_id = "demo"
"#,
    );

    let err = load_config(temp_file.path()).unwrap_err();
    assert!(err.to_string().contains("identity"));
}

#[test]
fn test_invalid_values_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    cleanup_env_vars();

    for content in [
        "[application]\nlog_level = \"verbose\"\n",
        "[store]\nbackend = \"sqlite\"\n",
        "[store]\ncollection = \"a/b\"\n",
        "[store]\ntimeout_seconds = 0\n",
        "[logging]\nlocal_rotation = \"weekly\"\n",
    ] {
        let temp_file = write_config(content);
        assert!(
            load_config(temp_file.path()).is_err(),
            "accepted invalid config: {content}"
        );
    }
}
