//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the registry using clap.

pub mod commands;
pub mod context;

use clap::{Parser, Subcommand};

/// AG Registry - patient registry record manager
#[derive(Parser, Debug)]
#[command(name = "registry")]
#[command(version, about, long_about = None)]
#[command(author = "AG Registry Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "registry.toml", env = "REGISTRY_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "REGISTRY_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List all patients with their BMI
    List(commands::records::ListArgs),

    /// Show one patient
    Show(commands::records::ShowArgs),

    /// Register a new patient
    Add(commands::records::AddArgs),

    /// Change fields of an existing patient
    Update(commands::records::UpdateArgs),

    /// Delete a patient
    Delete(commands::records::DeleteArgs),

    /// Export the patient list as a spreadsheet
    Export(commands::export::ExportArgs),

    /// Write a printable page of the patient list
    Print(commands::export::PrintArgs),

    /// Compute and classify a BMI
    Bmi(commands::bmi::BmiArgs),

    /// Interactive session with the record form
    Shell(commands::shell::ShellArgs),

    /// Create an account and send its verification email
    Register(commands::account::RegisterArgs),

    /// Check credentials and show the account role
    Login(commands::account::LoginArgs),

    /// Send a password reset email
    ResetPassword(commands::account::ResetPasswordArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
