//! External system integrations for the registry.
//!
//! - [`store`] - where patient records live (REST server, document store, memory)
//! - [`identity`] - account sign-up and sign-in for the document store backend
//!
//! # Design Pattern
//!
//! Adapters isolate third-party HTTP APIs behind traits so the view logic can be
//! tested against [`store::InMemoryRecordStore`] and mock servers.
//!
//! ```rust,no_run
//! use ag_registry::adapters::store::create_record_store;
//! use ag_registry::config::RegistryConfig;
//! use tokio::sync::watch;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RegistryConfig::default();
//! let (_session_tx, session_rx) = watch::channel(None);
//! let store = create_record_store(&config, session_rx)?;
//! let records = store.list().await?;
//! println!("{} patients in {}", records.len(), store.backend_name());
//! # Ok(())
//! # }
//! ```

pub mod identity;
pub mod store;
