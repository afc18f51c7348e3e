//! Record-entry form validation
//!
//! Validation is deliberately coarse: a missing value and an out-of-range value
//! produce the same message for a field.

use super::patient::{DraftRecord, Field};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Accepted height range in centimeters
pub const HEIGHT_RANGE_CM: RangeInclusive<f64> = 100.0..=250.0;

/// Accepted weight range in kilograms
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 30.0..=300.0;

/// Per-field validation outcome of a draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Error message per failing field
    pub field_errors: BTreeMap<Field, String>,
}

impl ValidationReport {
    /// True iff no field produced an error
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty()
    }

    /// Error message for a field, if any
    pub fn error_for(&self, field: Field) -> Option<&str> {
        self.field_errors.get(&field).map(String::as_str)
    }

    /// All messages joined for a one-line notice
    pub fn summary(&self) -> String {
        self.field_errors
            .iter()
            .map(|(field, msg)| format!("{field}: {msg}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validates a draft against the static field constraints
///
/// # Examples
///
/// ```
/// use ag_registry::domain::patient::{DraftRecord, Field};
/// use ag_registry::domain::validation::validate;
///
/// let mut draft = DraftRecord::new();
/// draft.set_field(Field::Height, "170");
/// let report = validate(&draft);
/// assert!(!report.is_valid());
/// assert!(report.error_for(Field::Height).is_none());
/// assert!(report.error_for(Field::Name).is_some());
/// ```
pub fn validate(draft: &DraftRecord) -> ValidationReport {
    let mut field_errors = BTreeMap::new();

    if draft.name.trim().is_empty() {
        field_errors.insert(Field::Name, "Name is required".to_string());
    }

    if draft.birth_date.is_none() {
        field_errors.insert(
            Field::BirthDate,
            "Birth date is required (YYYY-MM-DD)".to_string(),
        );
    }

    if !in_range(draft.height, &HEIGHT_RANGE_CM) {
        field_errors.insert(
            Field::Height,
            format!(
                "Height must be between {} and {} cm",
                HEIGHT_RANGE_CM.start(),
                HEIGHT_RANGE_CM.end()
            ),
        );
    }

    if !in_range(draft.weight, &WEIGHT_RANGE_KG) {
        field_errors.insert(
            Field::Weight,
            format!(
                "Weight must be between {} and {} kg",
                WEIGHT_RANGE_KG.start(),
                WEIGHT_RANGE_KG.end()
            ),
        );
    }

    ValidationReport { field_errors }
}

fn in_range(value: Option<f64>, range: &RangeInclusive<f64>) -> bool {
    value.map(|v| range.contains(&v)).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn valid_draft() -> DraftRecord {
        let mut draft = DraftRecord::new();
        draft.set_field(Field::Name, "Anna Smirnova");
        draft.set_field(Field::BirthDate, "1975-03-08");
        draft.set_field(Field::Height, "165");
        draft.set_field(Field::Weight, "62");
        draft
    }

    #[test]
    fn test_valid_draft() {
        let report = validate(&valid_draft());
        assert!(report.is_valid());
        assert_eq!(report.summary(), "");
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut draft = valid_draft();
        draft.set_field(Field::Name, "   ");
        let report = validate(&draft);
        assert!(!report.is_valid());
        assert_eq!(report.error_for(Field::Name), Some("Name is required"));
        assert_eq!(report.field_errors.len(), 1);
    }

    #[test]
    fn test_empty_draft_reports_every_field() {
        let report = validate(&DraftRecord::new());
        for field in Field::ALL {
            assert!(report.error_for(field).is_some(), "missing error for {field}");
        }
    }

    #[test_case(Field::Height, "100", true ; "height lower bound")]
    #[test_case(Field::Height, "250", true ; "height upper bound")]
    #[test_case(Field::Height, "99.9", false ; "height below range")]
    #[test_case(Field::Height, "250.1", false ; "height above range")]
    #[test_case(Field::Weight, "30", true ; "weight lower bound")]
    #[test_case(Field::Weight, "300", true ; "weight upper bound")]
    #[test_case(Field::Weight, "29", false ; "weight below range")]
    #[test_case(Field::Weight, "heavy", false ; "weight malformed")]
    fn test_measurement_ranges(field: Field, raw: &str, ok: bool) {
        let mut draft = valid_draft();
        draft.set_field(field, raw);
        assert_eq!(validate(&draft).error_for(field).is_none(), ok);
    }

    #[test]
    fn test_missing_and_out_of_range_share_message() {
        let mut missing = valid_draft();
        missing.height = None;
        let mut out_of_range = valid_draft();
        out_of_range.height = Some(20.0);
        assert_eq!(
            validate(&missing).error_for(Field::Height),
            validate(&out_of_range).error_for(Field::Height)
        );
    }

    #[test]
    fn test_validate_is_idempotent() {
        let mut draft = valid_draft();
        draft.set_field(Field::Weight, "400");
        assert_eq!(validate(&draft), validate(&draft));
    }
}
