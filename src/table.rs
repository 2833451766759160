//! Plain-text rendering of tables for terminal output.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{
    frequency,
    schema::{CanonicalTable, InferenceReport},
};

const COLUMN_GAP: &str = "  ";

/// Aligns `rows` under `headers` with a dashed separator line.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h).max(1)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(&flatten_whitespace(cell)));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_line(headers, &widths));
    let rule = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    let rule_widths = widths.iter().map(|w| (*w).max(3)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_line(&rule, &rule_widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_line(row, &widths));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

/// One line per field: name, kind, distinct values, and the sample value that
/// decided the kind.
pub fn render_fields(table: &CanonicalTable, report: &InferenceReport) -> String {
    let headers = ["field", "kind", "distinct", "sample"]
        .map(String::from)
        .to_vec();
    let rows = table
        .fields()
        .iter()
        .zip(frequency::cardinality(table))
        .enumerate()
        .map(|(idx, (field, cardinality))| {
            vec![
                field.name.clone(),
                field.kind.to_string(),
                cardinality.distinct.to_string(),
                report.sample_value(idx).unwrap_or_default().to_string(),
            ]
        })
        .collect::<Vec<_>>();
    render_table(&headers, &rows)
}

/// The first `limit` rows of the table.
pub fn render_preview(table: &CanonicalTable, limit: usize) -> String {
    let rows = table
        .rows()
        .iter()
        .take(limit)
        .map(|row| row.cells().iter().map(|cell| cell.as_display()).collect())
        .collect::<Vec<Vec<String>>>();
    render_table(&table.headers(), &rows)
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (idx, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if idx > 0 {
            line.push_str(COLUMN_GAP);
        }
        let text = flatten_whitespace(cell);
        line.push_str(&text);
        let padding = width.saturating_sub(display_width(&text));
        line.extend(std::iter::repeat_n(' ', padding));
    }
    line.truncate(line.trim_end().len());
    line
}

/// Width in characters, ignoring ANSI colour sequences.
fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            chars.by_ref().find(|next| *next == 'm');
        } else {
            width += 1;
        }
    }
    width
}

fn flatten_whitespace(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
