//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Configurable log levels (overridable via `RUST_LOG`)
//! - Human-readable console output on stderr
//! - Local JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use ag_registry::logging::init_logging;
//! use ag_registry::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(patient_id = "17", "Patient record created");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a failed store operation with its operation name
///
/// # Example
///
/// ```no_run
/// use ag_registry::log_store_failure;
/// use ag_registry::domain::StoreError;
///
/// let error = StoreError::Connection("connection refused".to_string());
/// log_store_failure!("list", &error);
/// ```
#[macro_export]
macro_rules! log_store_failure {
    ($operation:expr, $error:expr) => {
        tracing::warn!(
            operation = $operation,
            error = %$error,
            "Record store operation failed"
        );
    };
    ($operation:expr, $id:expr, $error:expr) => {
        tracing::warn!(
            operation = $operation,
            patient_id = %$id,
            error = %$error,
            "Record store operation failed"
        );
    };
}

/// Log a completed reload of the record list
#[macro_export]
macro_rules! log_reload {
    ($count:expr, $duration:expr) => {
        tracing::debug!(
            count = $count,
            duration_ms = $duration.as_millis(),
            "Patient list reloaded"
        );
    };
}
