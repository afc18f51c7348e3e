//! Process-local record store
//!
//! Used for demos, offline work and tests. Ids are sequential integers rendered
//! as strings and are never reused within a process.

use super::RecordStore;
use crate::domain::{PatientFields, PatientId, PatientRecord, Result, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// In-memory record store
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<BTreeMap<u64, PatientRecord>>,
    last_id: AtomicU64,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with records, ids assigned in order from 1
    pub fn with_records(fields: impl IntoIterator<Item = PatientFields>) -> Self {
        let mut records = BTreeMap::new();
        let mut last_id = 0;
        for f in fields {
            last_id += 1;
            records.insert(last_id, PatientRecord::new(id_for(last_id), f));
        }

        Self {
            records: RwLock::new(records),
            last_id: AtomicU64::new(last_id),
        }
    }

    /// Number of records currently held
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn id_for(key: u64) -> PatientId {
    PatientId::from(key)
}

// Only the canonical decimal form names a record, so "01" and "+1" miss.
fn key_for(id: &PatientId) -> Option<u64> {
    id.as_str()
        .parse()
        .ok()
        .filter(|key: &u64| key.to_string() == id.as_str())
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list(&self) -> Result<Vec<PatientRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn get(&self, id: &PatientId) -> Result<PatientRecord> {
        let records = self.records.read().await;
        key_for(id)
            .and_then(|key| records.get(&key).cloned())
            .ok_or_else(|| StoreError::NotFound(id.to_string()).into())
    }

    async fn create(&self, fields: &PatientFields) -> Result<PatientRecord> {
        let key = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = PatientRecord::new(id_for(key), fields.clone());
        self.records.write().await.insert(key, record.clone());

        tracing::info!(patient_id = %record.id, "Patient record created");
        Ok(record)
    }

    async fn update(&self, id: &PatientId, fields: &PatientFields) -> Result<()> {
        let mut records = self.records.write().await;
        let record = key_for(id)
            .and_then(|key| records.get_mut(&key))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let stored_id = record.id.clone();
        *record = PatientRecord::new(stored_id, fields.clone());

        tracing::info!(patient_id = %id, "Patient record updated");
        Ok(())
    }

    async fn delete(&self, id: &PatientId) -> Result<()> {
        let mut records = self.records.write().await;
        key_for(id)
            .and_then(|key| records.remove(&key))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        tracing::info!(patient_id = %id, "Patient record deleted");
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
