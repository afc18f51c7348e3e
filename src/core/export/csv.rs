//! Spreadsheet export
//!
//! Rows are written as CSV with RFC 4180 quoting, which every spreadsheet
//! application opens directly.

use super::rows::{PatientRow, COLUMNS};
use super::summary::ExportSummary;
use crate::domain::{RegistryError, Result};
use std::path::Path;
use std::time::Instant;

/// Renders rows as a CSV document with a header line
pub fn export_csv(rows: &[PatientRow]) -> String {
    let mut csv = String::new();

    csv.push_str(&join_line(COLUMNS.iter().map(|c| escape_csv(c))));
    for row in rows {
        csv.push_str(&join_line(row.cells().iter().map(|c| escape_csv(c))));
    }

    csv
}

/// Writes the CSV document to `path`, replacing any existing file
pub fn write_csv(rows: &[PatientRow], path: &Path) -> Result<ExportSummary> {
    let started = Instant::now();

    std::fs::write(path, export_csv(rows)).map_err(|e| {
        RegistryError::Io(format!("Failed to write spreadsheet {}: {e}", path.display()))
    })?;

    let summary = ExportSummary::from_rows(rows, path).with_duration(started.elapsed());
    summary.log_summary("spreadsheet");
    Ok(summary)
}

fn join_line(cells: impl Iterator<Item = String>) -> String {
    let mut line = cells.collect::<Vec<_>>().join(",");
    line.push_str("\r\n");
    line
}

/// Quotes a field if it contains a delimiter, quote or line break
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
