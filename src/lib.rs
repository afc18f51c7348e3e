// AG Registry - Patient registry record manager
// Copyright (c) 2025 AG Registry Contributors
// Licensed under the MIT License

//! # AG Registry - patient registry record manager
//!
//! A small registry of patient records (name, birth date, height, weight)
//! with derived BMI categories, kept in a REST records server, a cloud
//! document store or process memory.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Validating** form input before anything reaches the store
//! - **Classifying** body mass index into weight categories
//! - **Managing** records through create, read, update and delete
//! - **Exporting** the current list to a spreadsheet or a printable page
//! - **Gating** access behind sign-in with a verified email for the document store
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (view orchestration, auth gate, export)
//! - [`adapters`] - External integrations (record stores, identity provider)
//! - [`domain`] - Core domain types, BMI and validation
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ag_registry::adapters::store::InMemoryRecordStore;
//! use ag_registry::core::orchestrator::{Outcome, ViewOrchestrator};
//! use ag_registry::domain::Field;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut view = ViewOrchestrator::new(Arc::new(InMemoryRecordStore::new()));
//!
//!     view.set_field(Field::Name, "Ivan Petrov");
//!     view.set_field(Field::BirthDate, "1980-05-17");
//!     view.set_field(Field::Height, "178");
//!     view.set_field(Field::Weight, "82");
//!
//!     if let Outcome::Saved { id, .. } = view.submit().await {
//!         println!("Saved patient {id}");
//!     }
//!     for row in view.rows() {
//!         println!("{} {}", row.record.display_name(), row.category_display());
//!     }
//! }
//! ```
//!
//! ## BMI
//!
//! ```rust
//! use ag_registry::domain::{classify_bmi, BmiBand, BmiClass};
//!
//! assert_eq!(classify_bmi(Some(170.0), Some(70.0)), BmiClass::Band(BmiBand::Normal));
//! assert_eq!(classify_bmi(Some(0.0), Some(70.0)), BmiClass::InsufficientData);
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`], whose error type
//! [`domain::RegistryError`] separates configuration, validation, store and
//! auth failures.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
