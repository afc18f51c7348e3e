//! Record commands: `list`, `show`, `add`, `update`, `delete`

use crate::cli::context::{exit, exit_code_for_outcome, print_notice, Registry};
use crate::core::export::{render_table, PatientRow};
use crate::core::orchestrator::Outcome;
use crate::domain::{Field, PatientId, PatientRecord};
use clap::Args;
use serde::Serialize;

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedPatient<'a> {
    #[serde(flatten)]
    record: &'a PatientRecord,
    bmi: Option<f64>,
    category: Option<&'static str>,
}

impl<'a> From<&'a PatientRow> for ListedPatient<'a> {
    fn from(row: &'a PatientRow) -> Self {
        Self {
            record: &row.record,
            bmi: row.bmi.rounded(),
            category: row.class.band().map(|b| b.label()),
        }
    }
}

impl ListArgs {
    /// Execute the list command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut registry = match Registry::open(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };

        let outcome = registry.view.refresh().await;
        if !outcome.is_success() {
            print_notice(&outcome);
            return Ok(exit_code_for_outcome(&outcome));
        }

        let rows = registry.view.rows();
        if self.json {
            let listed: Vec<ListedPatient> = rows.iter().map(ListedPatient::from).collect();
            println!("{}", serde_json::to_string_pretty(&listed)?);
        } else {
            print!("{}", render_table(rows));
        }
        Ok(exit::OK)
    }
}

/// Arguments for the show command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Patient id
    pub id: PatientId,
}

impl ShowArgs {
    /// Execute the show command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let registry = match Registry::open(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };

        let outcome = registry.view.details(&self.id).await;
        match outcome {
            Outcome::Details(ref row) => print_details(row),
            ref other => print_notice(other),
        }
        Ok(exit_code_for_outcome(&outcome))
    }
}

/// Form fields accepted by `add` and `update`
#[derive(Args, Debug, Default)]
pub struct RecordFieldArgs {
    /// Full name
    #[arg(long)]
    pub name: Option<String>,

    /// Birth date (YYYY-MM-DD)
    #[arg(long)]
    pub birth_date: Option<String>,

    /// Height in centimeters
    #[arg(long)]
    pub height: Option<String>,

    /// Weight in kilograms
    #[arg(long)]
    pub weight: Option<String>,
}

impl RecordFieldArgs {
    /// Provided fields in form order
    pub fn provided(&self) -> Vec<(Field, &str)> {
        [
            (Field::Name, &self.name),
            (Field::BirthDate, &self.birth_date),
            (Field::Height, &self.height),
            (Field::Weight, &self.weight),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

/// Arguments for the add command
#[derive(Args, Debug)]
pub struct AddArgs {
    #[command(flatten)]
    pub fields: RecordFieldArgs,
}

impl AddArgs {
    /// Execute the add command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut registry = match Registry::open(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };

        for (field, value) in self.fields.provided() {
            registry.view.set_field(field, value);
        }

        let outcome = registry.view.submit().await;
        print_notice(&outcome);
        Ok(exit_code_for_outcome(&outcome))
    }
}

/// Arguments for the update command
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Patient id
    pub id: PatientId,

    /// Fields to change; the others keep their stored values
    #[command(flatten)]
    pub fields: RecordFieldArgs,
}

impl UpdateArgs {
    /// Execute the update command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut registry = match Registry::open(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };

        let opened = registry.view.begin_edit(&self.id).await;
        if !opened.is_success() {
            print_notice(&opened);
            return Ok(exit_code_for_outcome(&opened));
        }

        for (field, value) in self.fields.provided() {
            registry.view.set_field(field, value);
        }

        let outcome = registry.view.submit().await;
        print_notice(&outcome);
        Ok(exit_code_for_outcome(&outcome))
    }
}

/// Arguments for the delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Patient id
    pub id: PatientId,
}

impl DeleteArgs {
    /// Execute the delete command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let mut registry = match Registry::open(config_path).await {
            Ok(r) => r,
            Err(code) => return Ok(code),
        };

        let outcome = registry.view.delete(&self.id).await;
        print_notice(&outcome);
        Ok(exit_code_for_outcome(&outcome))
    }
}

/// Prints one record with its derived BMI
pub fn print_details(row: &PatientRow) {
    println!("Patient {}", row.record.id);
    println!("  Name:        {}", row.record.display_name());
    println!("  Birth date:  {}", row.record.display_birth_date());
    println!(
        "  Height (cm): {}",
        crate::domain::patient::display_measure(row.record.height)
    );
    println!(
        "  Weight (kg): {}",
        crate::domain::patient::display_measure(row.record.weight)
    );
    println!("  BMI:         {}", row.bmi.display());
    println!("  Category:    {}", row.category_display());
}
