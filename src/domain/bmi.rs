//! Body-mass-index calculation and classification
//!
//! BMI is `weight(kg) / height(m)^2`. Heights are stored in centimeters.
//!
//! Classification scans [`BMI_BANDS`] in ascending order of upper bound and takes
//! the first band whose bound is strictly greater than the value; anything that
//! matches no entry is [`BmiBand::Obese`]. The table must stay sorted for the
//! partition to hold with no gap and no overlap.
//!
//! Missing, zero, negative or non-finite inputs never produce an error: they yield
//! [`BmiValue::Unavailable`] / [`BmiClass::InsufficientData`], because stored
//! records may legitimately lack a height or weight.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four BMI categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiBand {
    /// BMI < 18.5
    Underweight,
    /// 18.5 <= BMI < 25
    Normal,
    /// 25 <= BMI < 30
    Overweight,
    /// BMI >= 30
    Obese,
}

/// Ordered `(exclusive upper bound, band)` pairs, scanned first-match-wins.
pub const BMI_BANDS: [(f64, BmiBand); 3] = [
    (18.5, BmiBand::Underweight),
    (25.0, BmiBand::Normal),
    (30.0, BmiBand::Overweight),
];

impl BmiBand {
    /// Classifies an unrounded BMI value
    pub fn for_value(bmi: f64) -> Self {
        BMI_BANDS
            .iter()
            .find(|(upper, _)| bmi < *upper)
            .map(|(_, band)| *band)
            .unwrap_or(BmiBand::Obese)
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            BmiBand::Underweight => "Underweight",
            BmiBand::Normal => "Normal weight",
            BmiBand::Overweight => "Overweight",
            BmiBand::Obese => "Obesity",
        }
    }

    /// Status icon shown next to the label
    pub fn icon(&self) -> &'static str {
        match self {
            BmiBand::Underweight => "⚠️",
            BmiBand::Normal => "✅",
            BmiBand::Overweight => "⚠️",
            BmiBand::Obese => "❗",
        }
    }
}

impl fmt::Display for BmiBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Result of [`compute_bmi`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BmiValue {
    /// Unrounded BMI
    Available(f64),
    /// Height or weight missing or not positive
    Unavailable,
}

impl BmiValue {
    /// Unrounded value, if any
    pub fn value(&self) -> Option<f64> {
        match self {
            BmiValue::Available(v) => Some(*v),
            BmiValue::Unavailable => None,
        }
    }

    /// Value rounded to one decimal place
    pub fn rounded(&self) -> Option<f64> {
        self.value().map(|v| (v * 10.0).round() / 10.0)
    }

    /// One-decimal display string, `-` when unavailable
    pub fn display(&self) -> String {
        match self.rounded() {
            Some(r) => format!("{r:.1}"),
            None => "-".to_string(),
        }
    }
}

/// Result of [`classify_bmi`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BmiClass {
    /// The unique band for the measurements
    Band(BmiBand),
    /// Height or weight missing or not positive
    InsufficientData,
}

impl BmiClass {
    /// The band, if the measurements allowed one
    pub fn band(&self) -> Option<BmiBand> {
        match self {
            BmiClass::Band(b) => Some(*b),
            BmiClass::InsufficientData => None,
        }
    }
}

fn usable(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite() && *x > 0.0)
}

/// Computes BMI from height in centimeters and weight in kilograms
///
/// # Examples
///
/// ```
/// use ag_registry::domain::bmi::{compute_bmi, BmiValue};
///
/// assert_eq!(compute_bmi(Some(170.0), Some(70.0)).display(), "24.2");
/// assert_eq!(compute_bmi(None, Some(70.0)), BmiValue::Unavailable);
/// ```
pub fn compute_bmi(height_cm: Option<f64>, weight_kg: Option<f64>) -> BmiValue {
    match (usable(height_cm), usable(weight_kg)) {
        (Some(h), Some(w)) => {
            let meters = h / 100.0;
            let bmi = w / (meters * meters);
            if bmi.is_finite() {
                BmiValue::Available(bmi)
            } else {
                BmiValue::Unavailable
            }
        }
        _ => BmiValue::Unavailable,
    }
}

/// Classifies height/weight into a [`BmiBand`] using the unrounded BMI
pub fn classify_bmi(height_cm: Option<f64>, weight_kg: Option<f64>) -> BmiClass {
    match compute_bmi(height_cm, weight_kg) {
        BmiValue::Available(v) => BmiClass::Band(BmiBand::for_value(v)),
        BmiValue::Unavailable => BmiClass::InsufficientData,
    }
}
