//! Record store factory
//!
//! Picks the record store implementation named by `store.backend`.

use super::{FirestoreRecordStore, InMemoryRecordStore, RecordStore, RestRecordStore};
use crate::adapters::identity::Session;
use crate::config::schema::{RegistryConfig, StoreBackend};
use crate::domain::Result;
use std::sync::Arc;
use tokio::sync::watch;

/// Create a record store based on the configuration
///
/// The session channel is only read by backends that authorize requests with the
/// signed-in user's token; the others ignore it.
///
/// # Errors
///
/// Returns an error if the store cannot be configured (bad URL, missing project id)
pub fn create_record_store(
    config: &RegistryConfig,
    session: watch::Receiver<Option<Session>>,
) -> Result<Arc<dyn RecordStore>> {
    match config.store.backend {
        StoreBackend::Rest => {
            tracing::info!(base_url = %config.store.base_url, "Creating REST record store");
            Ok(Arc::new(RestRecordStore::new(&config.store)?))
        }
        StoreBackend::Firestore => {
            tracing::info!(
                project_id = config.store.project_id.as_deref().unwrap_or_default(),
                "Creating document record store"
            );
            Ok(Arc::new(FirestoreRecordStore::new(&config.store, session)?))
        }
        StoreBackend::Memory => {
            tracing::info!("Creating in-memory record store");
            Ok(Arc::new(InMemoryRecordStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_selects_backend() {
        let (_tx, rx) = watch::channel(None);

        let mut config = RegistryConfig::default();
        let store = create_record_store(&config, rx.clone()).unwrap();
        assert_eq!(store.backend_name(), "rest");

        config.store.backend = StoreBackend::Memory;
        let store = create_record_store(&config, rx.clone()).unwrap();
        assert_eq!(store.backend_name(), "memory");

        config.store.backend = StoreBackend::Firestore;
        config.store.project_id = Some("demo".to_string());
        let store = create_record_store(&config, rx).unwrap();
        assert_eq!(store.backend_name(), "firestore");
    }

    #[test]
    fn test_factory_rejects_firestore_without_project() {
        let (_tx, rx) = watch::channel(None);
        let mut config = RegistryConfig::default();
        config.store.backend = StoreBackend::Firestore;

        assert!(create_record_store(&config, rx).is_err());
    }
}
