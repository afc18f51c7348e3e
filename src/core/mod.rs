//! Core logic of the registry.
//!
//! # Modules
//!
//! - [`orchestrator`] - view state machine wiring form input to validation and the store
//! - [`auth`] - session tracking and the verified-email gate
//! - [`export`] - table, spreadsheet and print rendering of the record set
//!
//! # Workflow
//!
//! 1. **Sign in** (document store backend only): the [`auth::AuthGate`] admits verified accounts
//! 2. **Load**: the orchestrator lists all records and derives BMI rows
//! 3. **Edit**: form input is validated on every change; submit creates or updates
//! 4. **Reload**: every successful mutation re-lists the store
//! 5. **Export**: rows currently shown go to CSV or a printable page

pub mod auth;
pub mod export;
pub mod orchestrator;
