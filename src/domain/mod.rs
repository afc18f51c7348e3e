//! Domain models and types for the registry.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`PatientId`])
//! - **Domain models** ([`PatientRecord`], [`PatientFields`], [`DraftRecord`])
//! - **BMI calculation** ([`compute_bmi`], [`classify_bmi`], [`BmiBand`])
//! - **Form validation** ([`validate`], [`ValidationReport`])
//! - **Error types** ([`RegistryError`], [`StoreError`], [`AuthError`])
//! - **Result type alias** ([`Result`])
//!
//! Everything here is pure: no I/O, no clock, no global state.
//!
//! # Example
//!
//! ```rust
//! use ag_registry::domain::{classify_bmi, validate, BmiBand, BmiClass, DraftRecord, Field};
//!
//! let mut draft = DraftRecord::new();
//! draft.set_field(Field::Name, "Ivan Petrov");
//! draft.set_field(Field::BirthDate, "1980-05-17");
//! draft.set_field(Field::Height, "170");
//! draft.set_field(Field::Weight, "70");
//!
//! assert!(validate(&draft).is_valid());
//! assert_eq!(classify_bmi(draft.height, draft.weight), BmiClass::Band(BmiBand::Normal));
//! ```

pub mod bmi;
pub mod errors;
pub mod ids;
pub mod patient;
pub mod result;
pub mod validation;

// Re-export commonly used types for convenience
pub use bmi::{classify_bmi, compute_bmi, BmiBand, BmiClass, BmiValue};
pub use errors::{AuthError, RegistryError, StoreError};
pub use ids::PatientId;
pub use patient::{DraftRecord, Field, PatientFields, PatientRecord};
pub use result::Result;
pub use validation::{validate, ValidationReport};
