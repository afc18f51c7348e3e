//! View orchestration
//!
//! [`ViewOrchestrator`] holds the only client-side state there is: the current
//! [`ViewMode`], the [`DraftRecord`] behind the form and the rows last loaded
//! from the store. User actions go through the validator and the store and come
//! back as [`Outcome`]s.
//!
//! Every successful mutation is followed by a full reload, so rows on screen are
//! always a snapshot of the store and never patched locally.
//!
//! # Example
//!
//! ```rust,no_run
//! use ag_registry::adapters::store::InMemoryRecordStore;
//! use ag_registry::core::orchestrator::ViewOrchestrator;
//! use ag_registry::domain::Field;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let mut view = ViewOrchestrator::new(Arc::new(InMemoryRecordStore::new()));
//! view.set_field(Field::Name, "Ivan Petrov");
//! view.set_field(Field::BirthDate, "1980-05-17");
//! view.set_field(Field::Height, "178");
//! view.set_field(Field::Weight, "82");
//!
//! let outcome = view.submit().await;
//! println!("{}", outcome.notice());
//! # }
//! ```

pub mod outcome;

pub use outcome::{Failure, FailureKind, Notice, NoticeLevel, Outcome};

use crate::adapters::store::RecordStore;
use crate::core::export::{build_rows, write_csv, write_print_html, PatientRow};
use crate::domain::{validate, DraftRecord, Field, PatientId, Result, ValidationReport};
use crate::{log_reload, log_store_failure};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// What a submit will do
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Submit creates a new record
    #[default]
    Idle,
    /// Submit replaces this record
    Editing(PatientId),
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Idle => f.write_str("new record"),
            ViewMode::Editing(id) => write!(f, "editing {id}"),
        }
    }
}

/// Drives the record list and the entry form
pub struct ViewOrchestrator<S: RecordStore + ?Sized> {
    store: Arc<S>,
    mode: ViewMode,
    draft: DraftRecord,
    report: ValidationReport,
    rows: Vec<PatientRow>,
}

impl<S: RecordStore + ?Sized> ViewOrchestrator<S> {
    /// Create an orchestrator with an empty form and no rows loaded
    pub fn new(store: Arc<S>) -> Self {
        let draft = DraftRecord::new();
        let report = validate(&draft);
        Self {
            store,
            mode: ViewMode::Idle,
            draft,
            report,
            rows: Vec::new(),
        }
    }

    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    pub fn draft(&self) -> &DraftRecord {
        &self.draft
    }

    /// Validation result for the current draft
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Rows from the last successful reload
    pub fn rows(&self) -> &[PatientRow] {
        &self.rows
    }

    pub fn backend_name(&self) -> &str {
        self.store.backend_name()
    }

    /// Apply raw input to one form field and re-validate
    pub fn set_field(&mut self, field: Field, raw: &str) -> &ValidationReport {
        self.draft.set_field(field, raw);
        self.report = validate(&self.draft);
        &self.report
    }

    /// Create or update from the draft, depending on the mode
    ///
    /// An invalid draft never reaches the store.
    pub async fn submit(&mut self) -> Outcome {
        self.report = validate(&self.draft);
        if !self.report.is_valid() {
            tracing::debug!(errors = %self.report.summary(), "Submit refused");
            return Outcome::Invalid(self.report.clone());
        }

        let fields = self.draft.to_fields();
        match self.mode.clone() {
            ViewMode::Idle => match self.store.create(&fields).await {
                Ok(record) => {
                    self.reset_form();
                    let refreshed = self.reload().await.is_ok();
                    Outcome::Saved {
                        id: record.id,
                        refreshed,
                    }
                }
                Err(e) => {
                    log_store_failure!("create", &e);
                    Outcome::Failed(Failure::new("save", &e))
                }
            },
            ViewMode::Editing(id) => match self.store.update(&id, &fields).await {
                Ok(()) => {
                    self.reset_form();
                    let refreshed = self.reload().await.is_ok();
                    Outcome::Updated { id, refreshed }
                }
                Err(e) => {
                    log_store_failure!("update", &id, &e);
                    Outcome::Failed(Failure::new("update", &e))
                }
            },
        }
    }

    /// Load a record into the form and switch to editing it
    pub async fn begin_edit(&mut self, id: &PatientId) -> Outcome {
        match self.store.get(id).await {
            Ok(record) => {
                self.draft = DraftRecord::from_record(&record);
                self.report = validate(&self.draft);
                self.mode = ViewMode::Editing(record.id.clone());
                Outcome::Editing(record.id)
            }
            Err(e) => {
                log_store_failure!("get", id, &e);
                Outcome::Failed(Failure::new("edit", &e))
            }
        }
    }

    /// One record with its derived BMI
    pub async fn details(&self, id: &PatientId) -> Outcome {
        match self.store.get(id).await {
            Ok(record) => Outcome::Details(Box::new(PatientRow::from_record(record))),
            Err(e) => {
                log_store_failure!("get", id, &e);
                Outcome::Failed(Failure::new("show", &e))
            }
        }
    }

    /// Discard the draft and leave editing mode
    pub fn cancel(&mut self) -> Outcome {
        self.reset_form();
        Outcome::Cancelled
    }

    /// Remove a record; editing it ends if it was open in the form
    pub async fn delete(&mut self, id: &PatientId) -> Outcome {
        match self.store.delete(id).await {
            Ok(()) => {
                if self.mode == ViewMode::Editing(id.clone()) {
                    self.reset_form();
                }
                let refreshed = self.reload().await.is_ok();
                Outcome::Deleted {
                    id: id.clone(),
                    refreshed,
                }
            }
            Err(e) => {
                log_store_failure!("delete", id, &e);
                Outcome::Failed(Failure::new("delete", &e))
            }
        }
    }

    /// Reload the list from the store
    pub async fn refresh(&mut self) -> Outcome {
        match self.reload().await {
            Ok(count) => Outcome::Reloaded(count),
            Err(e) => Outcome::Failed(Failure::new("load patients", &e)),
        }
    }

    /// Write the rows currently shown to a spreadsheet file
    pub fn export(&self, path: &Path) -> Outcome {
        match write_csv(&self.rows, path) {
            Ok(summary) => Outcome::Exported(summary),
            Err(e) => Outcome::Failed(Failure::new("export", &e)),
        }
    }

    /// Write the rows currently shown to a printable document
    pub fn print(&self, path: &Path, title: &str) -> Outcome {
        match write_print_html(&self.rows, title, path) {
            Ok(summary) => Outcome::Printed(summary),
            Err(e) => Outcome::Failed(Failure::new("print", &e)),
        }
    }

    fn reset_form(&mut self) {
        self.mode = ViewMode::Idle;
        self.draft = DraftRecord::new();
        self.report = validate(&self.draft);
    }

    /// Replaces the rows with a fresh snapshot; rows are kept on failure
    async fn reload(&mut self) -> Result<usize> {
        let started = Instant::now();
        match self.store.list().await {
            Ok(records) => {
                self.rows = build_rows(records);
                log_reload!(self.rows.len(), started.elapsed());
                Ok(self.rows.len())
            }
            Err(e) => {
                log_store_failure!("list", &e);
                Err(e)
            }
        }
    }
}
