//! Export summary and reporting

use super::rows::PatientRow;
use crate::domain::BmiBand;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Summary of a spreadsheet or print export
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// File that was written
    pub path: PathBuf,

    /// Number of rows written
    pub rows: usize,

    /// Rows per BMI band
    pub bands: BTreeMap<BmiBand, usize>,

    /// Rows without enough data for a BMI
    pub unclassified: usize,

    /// Time spent rendering and writing
    pub duration: Duration,
}

impl ExportSummary {
    /// Tallies the rows written to `path`
    pub fn from_rows(rows: &[PatientRow], path: &Path) -> Self {
        let mut bands = BTreeMap::new();
        let mut unclassified = 0;

        for row in rows {
            match row.class.band() {
                Some(band) => *bands.entry(band).or_insert(0) += 1,
                None => unclassified += 1,
            }
        }

        Self {
            path: path.to_path_buf(),
            rows: rows.len(),
            bands,
            unclassified,
            duration: Duration::ZERO,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Rows in one band
    pub fn count(&self, band: BmiBand) -> usize {
        self.bands.get(&band).copied().unwrap_or(0)
    }

    /// Log the summary
    pub fn log_summary(&self, kind: &str) {
        tracing::info!(
            kind,
            path = %self.path.display(),
            rows = self.rows,
            underweight = self.count(BmiBand::Underweight),
            normal = self.count(BmiBand::Normal),
            overweight = self.count(BmiBand::Overweight),
            obese = self.count(BmiBand::Obese),
            unclassified = self.unclassified,
            duration_ms = self.duration.as_millis(),
            "Export written"
        );
    }
}
