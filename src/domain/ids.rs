//! Domain identifier types with validation
//!
//! Patient ids are assigned by the record store and treated as opaque strings.
//! json-server hands out numeric ids, Firestore hands out random document names;
//! both end up in a [`PatientId`].

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Patient record identifier newtype wrapper
///
/// # Examples
///
/// ```
/// use ag_registry::domain::ids::PatientId;
/// use std::str::FromStr;
///
/// let id = PatientId::from_str("7").unwrap();
/// assert_eq!(id.as_str(), "7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new PatientId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(PatientId)` if the ID is non-blank and contains no path separator,
    /// `Err` otherwise. The value is kept as given; use [`FromStr`] for typed input.
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Patient ID cannot be empty".to_string());
        }
        if id.contains('/') {
            return Err(format!("Patient ID cannot contain '/': {id}"));
        }
        Ok(Self(id))
    }

    /// Returns the patient ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Builds an id from a JSON value, accepting both numbers and strings
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Self::new(s.as_str()).ok(),
            serde_json::Value::Number(n) => Self::new(n.to_string()).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim())
    }
}

impl From<u64> for PatientId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for PatientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid patient id: {value}")))
    }
}
