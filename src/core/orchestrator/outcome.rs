//! Typed results of view actions
//!
//! The orchestrator never raises: every action returns an [`Outcome`] and the
//! presentation layer decides how to show it.

use crate::core::export::{ExportSummary, PatientRow};
use crate::domain::{AuthError, PatientId, RegistryError, StoreError, ValidationReport};
use std::fmt;

/// What an action did
#[derive(Debug, Clone)]
pub enum Outcome {
    /// A new record was created
    Saved { id: PatientId, refreshed: bool },
    /// An existing record was replaced
    Updated { id: PatientId, refreshed: bool },
    /// A record was removed
    Deleted { id: PatientId, refreshed: bool },
    /// The list was reloaded with this many rows
    Reloaded(usize),
    /// A record was loaded into the form for editing
    Editing(PatientId),
    /// One record's details
    Details(Box<PatientRow>),
    /// The form was cleared and editing abandoned
    Cancelled,
    /// Submit refused, the draft has field errors
    Invalid(ValidationReport),
    /// Spreadsheet written
    Exported(ExportSummary),
    /// Printable document written
    Printed(ExportSummary),
    /// The action failed; state is unchanged
    Failed(Failure),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::Invalid(_) | Outcome::Failed(_))
    }

    /// Message for the user
    pub fn notice(&self) -> Notice {
        match self {
            Outcome::Saved { id, refreshed } => {
                Notice::success(with_refresh(format!("Patient {id} saved"), *refreshed))
            }
            Outcome::Updated { id, refreshed } => {
                Notice::success(with_refresh(format!("Patient {id} updated"), *refreshed))
            }
            Outcome::Deleted { id, refreshed } => {
                Notice::success(with_refresh(format!("Patient {id} deleted"), *refreshed))
            }
            Outcome::Reloaded(count) => Notice::info(format!("{count} patient(s) loaded")),
            Outcome::Editing(id) => Notice::info(format!("Editing patient {id}")),
            Outcome::Details(row) => Notice::info(format!(
                "{} ({}), BMI {} {}",
                row.record.display_name(),
                row.record.display_birth_date(),
                row.bmi.display(),
                row.category_display()
            )),
            Outcome::Cancelled => Notice::info("Form cleared".to_string()),
            Outcome::Invalid(report) => {
                Notice::warning(format!("Please correct the form: {}", report.summary()))
            }
            Outcome::Exported(summary) => Notice::success(format!(
                "Exported {} patient(s) to {}",
                summary.rows,
                summary.path.display()
            )),
            Outcome::Printed(summary) => Notice::success(format!(
                "Printable list of {} patient(s) written to {}",
                summary.rows,
                summary.path.display()
            )),
            Outcome::Failed(failure) => Notice::error(failure.to_string()),
        }
    }
}

fn with_refresh(message: String, refreshed: bool) -> String {
    if refreshed {
        message
    } else {
        format!("{message} (list could not be refreshed)")
    }
}

/// Category of a failed action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Unauthorized,
    Connection,
    Rejected,
    Io,
    Other,
}

impl From<&RegistryError> for FailureKind {
    fn from(err: &RegistryError) -> Self {
        match err {
            RegistryError::Store(StoreError::NotFound(_)) => FailureKind::NotFound,
            RegistryError::Store(StoreError::Unauthorized(_)) | RegistryError::Auth(_) => {
                FailureKind::Unauthorized
            }
            RegistryError::Store(StoreError::Connection(_)) => FailureKind::Connection,
            RegistryError::Store(StoreError::Rejected { .. })
            | RegistryError::Store(StoreError::InvalidResponse(_)) => FailureKind::Rejected,
            RegistryError::Io(_) => FailureKind::Io,
            _ => FailureKind::Other,
        }
    }
}

/// A failed action with its reason
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// What was attempted ("save", "delete", ...)
    pub action: &'static str,
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(action: &'static str, err: &RegistryError) -> Self {
        let message = match err {
            RegistryError::Store(StoreError::NotFound(id)) => {
                format!("patient {id} no longer exists")
            }
            RegistryError::Auth(AuthError::NotSignedIn) => {
                "sign in with a verified account first".to_string()
            }
            other => other.to_string(),
        };
        Self {
            action,
            kind: FailureKind::from(err),
            message,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not {}: {}", self.action, self.message)
    }
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    fn success(text: String) -> Self {
        Self {
            level: NoticeLevel::Success,
            text,
        }
    }

    fn info(text: String) -> Self {
        Self {
            level: NoticeLevel::Info,
            text,
        }
    }

    fn warning(text: String) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text,
        }
    }

    fn error(text: String) -> Self {
        Self {
            level: NoticeLevel::Error,
            text,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
