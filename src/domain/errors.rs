//! Domain error types
//!
//! This module defines the error hierarchy for the registry. Store and identity
//! failures are kept in their own enums so callers can match on `NotFound` or
//! `EmailNotVerified` without inspecting HTTP details.

use thiserror::Error;

/// Main registry error type
///
/// This is the primary error type used throughout the application.
/// It wraps the collaborator-specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Record store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Identity provider errors
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Validation errors raised outside the form validator (ids, dates)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl RegistryError {
    /// Returns true if the error is a store `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::Store(StoreError::NotFound(_)))
    }
}

/// Record store errors
///
/// Errors that occur when talking to the external record store.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// The referenced record does not exist
    #[error("Patient record not found: {0}")]
    NotFound(String),

    /// The store answered with a non-success status
    #[error("Store rejected request: {status} - {message}")]
    Rejected { status: u16, message: String },

    /// The store could not be reached
    #[error("Failed to connect to record store: {0}")]
    Connection(String),

    /// The store answered with a body we could not understand
    #[error("Invalid response from record store: {0}")]
    InvalidResponse(String),

    /// The store refused the credentials (missing or expired session)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Identity provider errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Wrong email or password
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The account exists but its email address has not been confirmed
    #[error("Email address is not verified, check your inbox for the verification link")]
    EmailNotVerified,

    /// An operation needed a session and there is none
    #[error("Not signed in")]
    NotSignedIn,

    /// The provider rejected the request with its own message
    #[error("Identity provider error: {0}")]
    Provider(String),

    /// The provider could not be reached
    #[error("Failed to connect to identity provider: {0}")]
    Connection(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for RegistryError {
    fn from(err: toml::de::Error) -> Self {
        RegistryError::Configuration(format!("TOML parse error: {err}"))
    }
}
