//! Record store abstraction layer
//!
//! A trait-based abstraction over where patient records live, so the registry
//! can run against a REST records server, a cloud document store, or memory.

pub mod factory;
pub mod firestore;
pub(crate) mod http;
pub mod memory;
pub mod rest;
pub mod traits;

pub use factory::create_record_store;
pub use firestore::{DocumentCollection, FirestoreRecordStore};
pub use memory::InMemoryRecordStore;
pub use rest::RestRecordStore;
pub use traits::RecordStore;
