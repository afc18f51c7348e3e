//! Printable document and terminal table

use super::rows::{PatientRow, COLUMNS};
use super::summary::ExportSummary;
use crate::domain::{RegistryError, Result};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Instant;

/// Renders rows as a standalone HTML page with a bordered table
///
/// The page opens the print dialog when loaded in a browser.
pub fn render_print_html(rows: &[PatientRow], title: &str) -> String {
    let title = escape_html(title);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{title}</title>");
    html.push_str(
        "<style>\n\
         body { font-family: sans-serif; }\n\
         table { border-collapse: collapse; width: 100%; }\n\
         th, td { border: 1px solid #000; padding: 8px; text-align: left; }\n\
         </style>\n",
    );
    html.push_str("</head>\n<body onload=\"window.print()\">\n");
    let _ = writeln!(html, "<h1>{title}</h1>");

    html.push_str("<table>\n<thead>\n<tr>");
    for column in COLUMNS {
        let _ = write!(html, "<th>{}</th>", escape_html(column));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in rows {
        html.push_str("<tr>");
        for cell in row.cells() {
            let _ = write!(html, "<td>{}</td>", escape_html(&cell));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

/// Writes the printable document to `path`
pub fn write_print_html(rows: &[PatientRow], title: &str, path: &Path) -> Result<ExportSummary> {
    let started = Instant::now();

    std::fs::write(path, render_print_html(rows, title)).map_err(|e| {
        RegistryError::Io(format!(
            "Failed to write printable document {}: {e}",
            path.display()
        ))
    })?;

    let summary = ExportSummary::from_rows(rows, path).with_duration(started.elapsed());
    summary.log_summary("print");
    Ok(summary)
}

/// Renders rows as a plain-text table, one line per record, ids first
pub fn render_table(rows: &[PatientRow]) -> String {
    if rows.is_empty() {
        return "No patients registered.\n".to_string();
    }

    let header: Vec<String> = std::iter::once("ID".to_string())
        .chain(COLUMNS.iter().map(|c| c.to_string()))
        .collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = row.cells().to_vec();
            cells[5] = row.category_display();
            std::iter::once(row.record.id.to_string())
                .chain(cells)
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_table_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_table_line(&mut out, &rule, &widths);
    for cells in &body {
        push_table_line(&mut out, cells, &widths);
    }
    out
}

fn push_table_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
