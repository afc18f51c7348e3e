//! Export commands: `export` (spreadsheet) and `print` (printable page)

use crate::cli::context::{exit_code_for_outcome, print_notice, Registry};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file (defaults to export.csv_path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut registry = match Registry::open(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };

        let loaded = registry.view.refresh().await;
        if !loaded.is_success() {
            print_notice(&loaded);
            return Ok(exit_code_for_outcome(&loaded));
        }

        let path = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&registry.config.export.csv_path));

        let outcome = registry.view.export(&path);
        print_notice(&outcome);
        Ok(exit_code_for_outcome(&outcome))
    }
}

/// Arguments for the print command
#[derive(Args, Debug)]
pub struct PrintArgs {
    /// Output file (defaults to export.print_path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Page title (defaults to export.print_title)
    #[arg(long)]
    pub title: Option<String>,
}

impl PrintArgs {
    /// Execute the print command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut registry = match Registry::open(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };

        let loaded = registry.view.refresh().await;
        if !loaded.is_success() {
            print_notice(&loaded);
            return Ok(exit_code_for_outcome(&loaded));
        }

        let path = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&registry.config.export.print_path));
        let title = self
            .title
            .as_deref()
            .unwrap_or(&registry.config.export.print_title);

        let outcome = registry.view.print(&path, title);
        print_notice(&outcome);
        if outcome.is_success() {
            println!("   Open the file in a browser to print it.");
        }
        Ok(exit_code_for_outcome(&outcome))
    }
}
