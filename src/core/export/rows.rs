//! Rendered patient rows
//!
//! A [`PatientRow`] is a stored record plus the fields derived for display. Table,
//! spreadsheet and print output are all built from the same rows so they always
//! agree on BMI and category.

use crate::domain::bmi::{classify_bmi, compute_bmi, BmiClass, BmiValue};
use crate::domain::patient::display_measure;
use crate::domain::PatientRecord;

/// Column headers shared by every tabular output
pub const COLUMNS: [&str; 6] = [
    "Name",
    "Birth date",
    "Height (cm)",
    "Weight (kg)",
    "BMI",
    "Category",
];

/// One record as shown to the user
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRow {
    pub record: PatientRecord,
    pub bmi: BmiValue,
    pub class: BmiClass,
}

impl PatientRow {
    pub fn from_record(record: PatientRecord) -> Self {
        let bmi = compute_bmi(record.height, record.weight);
        let class = classify_bmi(record.height, record.weight);
        Self { record, bmi, class }
    }

    /// Category label, `-` when BMI is unavailable
    pub fn category_label(&self) -> &'static str {
        self.class.band().map(|b| b.label()).unwrap_or("-")
    }

    /// Status icon, empty when BMI is unavailable
    pub fn category_icon(&self) -> &'static str {
        self.class.band().map(|b| b.icon()).unwrap_or("")
    }

    /// Category with its icon, as shown in the table
    pub fn category_display(&self) -> String {
        match self.class.band() {
            Some(band) => format!("{} {}", band.icon(), band.label()),
            None => "-".to_string(),
        }
    }

    /// Display cells in [`COLUMNS`] order
    pub fn cells(&self) -> [String; 6] {
        [
            self.record.display_name().to_string(),
            self.record.display_birth_date(),
            display_measure(self.record.height),
            display_measure(self.record.weight),
            self.bmi.display(),
            self.category_label().to_string(),
        ]
    }
}

/// Builds display rows in store order
pub fn build_rows(records: impl IntoIterator<Item = PatientRecord>) -> Vec<PatientRow> {
    records.into_iter().map(PatientRow::from_record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BmiBand;
    use serde_json::json;

    #[test]
    fn test_row_derives_bmi_and_band() {
        let record = PatientRecord::from_json(&json!({
            "id": 1, "name": "Ivan", "birthDate": "1980-05-17", "height": 180, "weight": 81
        }))
        .unwrap();
        let row = PatientRow::from_record(record);

        assert_eq!(row.bmi.display(), "25.0");
        assert_eq!(row.class, BmiClass::Band(BmiBand::Overweight));
        assert_eq!(
            row.cells(),
            ["Ivan", "1980-05-17", "180", "81", "25.0", "Overweight"].map(String::from)
        );
    }

    #[test]
    fn test_row_without_measurements_uses_placeholders() {
        let record = PatientRecord::from_json(&json!({"id": "x", "name": "Legacy"})).unwrap();
        let row = PatientRow::from_record(record);

        assert_eq!(row.bmi, BmiValue::Unavailable);
        assert_eq!(row.category_label(), "-");
        assert_eq!(row.category_icon(), "");
        assert_eq!(row.category_display(), "-");
        assert_eq!(row.cells()[1..5], ["-", "-", "-", "-"].map(String::from));
    }
}
