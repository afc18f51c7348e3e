//! Result type alias for the registry

use super::errors::RegistryError;

/// Result type alias for registry operations
///
/// # Examples
///
/// ```
/// use ag_registry::domain::result::Result;
/// use ag_registry::domain::errors::RegistryError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(RegistryError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, RegistryError>;
