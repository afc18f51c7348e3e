//! Rendering of the current record set
//!
//! Builds [`PatientRow`]s (record + derived BMI and category) and turns them into
//! a terminal table, a spreadsheet (CSV) or a printable HTML document.

pub mod csv;
pub mod print;
pub mod rows;
pub mod summary;

pub use csv::{export_csv, write_csv};
pub use print::{render_print_html, render_table, write_print_html};
pub use rows::{build_rows, PatientRow, COLUMNS};
pub use summary::ExportSummary;
