//! Integration tests for logging functionality

use ag_registry::config::LoggingConfig;
use ag_registry::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "logs");
    assert_eq!(config.local_rotation, "daily");
}

// The global subscriber can only be installed once per process, so file
// logging is covered by a single test.
#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };
    assert!(!log_path.exists());

    let guard = init_logging("debug", &config).unwrap();
    tracing::info!(patient_id = "1", "Patient record created");
    drop(guard);

    assert!(log_path.is_dir());
    assert!(log_path.join("registry.log").exists());
}
