//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod account;
pub mod bmi;
pub mod export;
pub mod init;
pub mod records;
pub mod shell;
pub mod validate;
