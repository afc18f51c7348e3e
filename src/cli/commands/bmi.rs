//! BMI command: classify a height/weight pair without touching the store

use crate::cli::context::exit;
use crate::domain::bmi::{classify_bmi, compute_bmi, BmiClass};
use clap::Args;

/// Arguments for the bmi command
#[derive(Args, Debug)]
pub struct BmiArgs {
    /// Height in centimeters
    #[arg(long)]
    pub height: f64,

    /// Weight in kilograms
    #[arg(long)]
    pub weight: f64,
}

impl BmiArgs {
    /// Execute the bmi command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        println!("{}", describe(Some(self.height), Some(self.weight)));
        Ok(exit::OK)
    }
}

/// One-line BMI description
pub fn describe(height: Option<f64>, weight: Option<f64>) -> String {
    let bmi = compute_bmi(height, weight);
    match classify_bmi(height, weight) {
        BmiClass::Band(band) => format!("BMI {} {} {}", bmi.display(), band.icon(), band.label()),
        BmiClass::InsufficientData => "BMI - (height and weight must be positive)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(describe(Some(170.0), Some(70.0)), "BMI 24.2 ✅ Normal weight");
        assert_eq!(describe(Some(150.0), Some(90.0)), "BMI 40.0 ❗ Obesity");
        assert!(describe(Some(0.0), Some(70.0)).starts_with("BMI -"));
    }
}
