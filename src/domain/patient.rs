//! Patient record domain model
//!
//! - [`PatientRecord`] is what the store holds, with a store-assigned id.
//! - [`PatientFields`] is the request body for create and replace (no id).
//! - [`DraftRecord`] is the unsaved form state, mutated field by field.

use super::ids::PatientId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Date format used on the wire and in the form
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A registered patient as held by the record store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Store-assigned identifier
    pub id: PatientId,

    /// Full name
    pub name: String,

    /// Birth date, absent on some legacy records
    pub birth_date: Option<NaiveDate>,

    /// Height in centimeters
    pub height: Option<f64>,

    /// Weight in kilograms
    pub weight: Option<f64>,
}

impl PatientRecord {
    /// Creates a record from an id and a set of fields
    pub fn new(id: PatientId, fields: PatientFields) -> Self {
        Self {
            id,
            name: fields.name,
            birth_date: fields.birth_date,
            height: fields.height,
            weight: fields.weight,
        }
    }

    /// Parses a loosely-typed store document into a record
    ///
    /// The store is schemaless, so this is where shapes get checked:
    /// - `id` must be a string or a number
    /// - `name` must be a string when present (missing is kept as empty)
    /// - `height`/`weight` accept numbers or numeric strings; anything else is absent
    /// - `birthDate` must be `YYYY-MM-DD`; anything else is absent
    pub fn from_json(value: &serde_json::Value) -> Result<Self, String> {
        let obj = value
            .as_object()
            .ok_or_else(|| format!("expected a JSON object, got {value}"))?;

        let id = obj
            .get("id")
            .and_then(PatientId::from_json)
            .ok_or_else(|| "record has no usable id".to_string())?;

        let name = match obj.get("name") {
            None | Some(serde_json::Value::Null) => String::new(),
            Some(serde_json::Value::String(s)) => s.trim().to_string(),
            Some(other) => return Err(format!("record {id} has a non-text name: {other}")),
        };

        Ok(Self {
            id,
            name,
            birth_date: obj.get("birthDate").and_then(parse_date_value),
            height: obj.get("height").and_then(parse_number_value),
            weight: obj.get("weight").and_then(parse_number_value),
        })
    }

    /// The writable part of the record
    pub fn fields(&self) -> PatientFields {
        PatientFields {
            name: self.name.clone(),
            birth_date: self.birth_date,
            height: self.height,
            weight: self.weight,
        }
    }

    /// Name for display, `-` when empty
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "-"
        } else {
            &self.name
        }
    }

    /// Birth date for display, `-` when absent
    pub fn display_birth_date(&self) -> String {
        display_date(self.birth_date)
    }
}

/// Record body for create and replace requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientFields {
    /// Full name
    pub name: String,

    /// Birth date
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub birth_date: Option<NaiveDate>,

    /// Height in centimeters
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub height: Option<f64>,

    /// Weight in kilograms
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub weight: Option<f64>,
}

/// A form field of the record-entry form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    BirthDate,
    Height,
    Weight,
}

impl Field {
    /// All form fields in display order
    pub const ALL: [Field; 4] = [Field::Name, Field::BirthDate, Field::Height, Field::Weight];

    /// Field key as used on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::BirthDate => "birth-date",
            Field::Height => "height",
            Field::Weight => "weight",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(Field::Name),
            "birth-date" | "birth_date" | "birthdate" | "dob" => Ok(Field::BirthDate),
            "height" => Ok(Field::Height),
            "weight" => Ok(Field::Weight),
            other => Err(format!(
                "Unknown field '{other}'. Must be one of: name, birth-date, height, weight"
            )),
        }
    }
}

/// Unsaved form state
///
/// `editing_id` is set while an existing record is being edited; a submit then
/// replaces that record instead of creating a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftRecord {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub editing_id: Option<PatientId>,
}

impl DraftRecord {
    /// Creates an empty draft
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a draft pre-filled from an existing record
    pub fn from_record(record: &PatientRecord) -> Self {
        Self {
            name: record.name.clone(),
            birth_date: record.birth_date,
            height: record.height,
            weight: record.weight,
            editing_id: Some(record.id.clone()),
        }
    }

    /// Applies raw form input to one field
    ///
    /// Input that does not parse leaves the field absent; the validator reports
    /// it exactly like a missing value.
    pub fn set_field(&mut self, field: Field, raw: &str) {
        let raw = raw.trim();
        match field {
            Field::Name => self.name = raw.to_string(),
            Field::BirthDate => self.birth_date = NaiveDate::parse_from_str(raw, DATE_FORMAT).ok(),
            Field::Height => self.height = parse_number(raw),
            Field::Weight => self.weight = parse_number(raw),
        }
    }

    /// Raw text currently held by a field, as it would be shown in the form
    pub fn field_text(&self, field: Field) -> String {
        match field {
            Field::Name => self.name.clone(),
            Field::BirthDate => self
                .birth_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            Field::Height => self.height.map(|v| v.to_string()).unwrap_or_default(),
            Field::Weight => self.weight.map(|v| v.to_string()).unwrap_or_default(),
        }
    }

    /// Converts the draft into a request body
    pub fn to_fields(&self) -> PatientFields {
        PatientFields {
            name: self.name.trim().to_string(),
            birth_date: self.birth_date,
            height: self.height,
            weight: self.weight,
        }
    }

    /// True if the draft holds no input at all
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
            && self.birth_date.is_none()
            && self.height.is_none()
            && self.weight.is_none()
    }
}

/// Formats an optional date for display
pub fn display_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Formats an optional measurement for display
pub fn display_measure(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v}"))
        .unwrap_or_else(|| "-".to_string())
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn parse_number_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        serde_json::Value::String(s) => parse_number(s.trim()),
        _ => None,
    }
}

fn parse_date_value(value: &serde_json::Value) -> Option<NaiveDate> {
    value
        .as_str()
        .and_then(|s| NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok())
}
