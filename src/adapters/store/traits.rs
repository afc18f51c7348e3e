//! Record store trait definition
//!
//! The store is the sole authority on patient records. Implementations parse
//! whatever the backend returns into [`PatientRecord`] values at this boundary and
//! translate failures into [`StoreError`](crate::domain::StoreError) variants.

use crate::domain::{PatientFields, PatientId, PatientRecord, Result};
use async_trait::async_trait;

/// Create/read/update/delete access to patient records
///
/// Failures are never retried here; the caller decides what to tell the user.
///
/// # Example
///
/// ```no_run
/// use ag_registry::adapters::store::{InMemoryRecordStore, RecordStore};
/// use ag_registry::domain::PatientFields;
///
/// # async fn example() -> ag_registry::domain::Result<()> {
/// let store = InMemoryRecordStore::new();
/// let created = store
///     .create(&PatientFields {
///         name: "Ivan Petrov".to_string(),
///         birth_date: None,
///         height: Some(178.0),
///         weight: Some(82.0),
///     })
///     .await?;
///
/// let all = store.list().await?;
/// assert!(all.iter().any(|r| r.id == created.id));
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every record
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be reached or rejects the request.
    /// Individual malformed documents are skipped, not reported.
    async fn list(&self) -> Result<Vec<PatientRecord>>;

    /// Fetch one record
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record has this id.
    async fn get(&self, id: &PatientId) -> Result<PatientRecord>;

    /// Create a record; the store assigns the id
    async fn create(&self, fields: &PatientFields) -> Result<PatientRecord>;

    /// Replace the fields of an existing record
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record has this id.
    async fn update(&self, id: &PatientId, fields: &PatientFields) -> Result<()>;

    /// Remove a record
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no record has this id.
    async fn delete(&self, id: &PatientId) -> Result<()>;

    /// Short backend name for logs and status output
    fn backend_name(&self) -> &str;
}
