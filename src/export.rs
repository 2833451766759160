//! Serializing a canonical table back to text.
//!
//! Both encodings read back through the decoders into an equal table:
//! delimited output quotes only cells containing the delimiter, a quote or a
//! line break, and JSON output is an array of objects in column order.

use anyhow::{Context, Result};
use clap::ValueEnum;
use csv::QuoteStyle;
use serde::{Deserialize, Serialize};

use crate::schema::CanonicalTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    #[default]
    Json,
    /// No spreadsheet writer exists; exports as JSON.
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json | ExportFormat::Xlsx => "json",
        }
    }
}

pub fn export(table: &CanonicalTable, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Csv => to_delimited(table, b','),
        ExportFormat::Json | ExportFormat::Xlsx => to_json(table),
    }
}

pub fn to_delimited(table: &CanonicalTable, delimiter: u8) -> Result<String> {
    if table.fields().is_empty() {
        return Ok(String::new());
    }
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true)
        .from_writer(Vec::new());
    writer
        .write_record(table.fields().iter().map(|field| field.name.as_str()))
        .context("Writing header row")?;
    for (idx, row) in table.rows().iter().enumerate() {
        writer
            .write_record(row.cells().iter().map(|cell| cell.as_display()))
            .with_context(|| format!("Writing row {}", idx + 1))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("Flushing delimited output: {}", err.error()))?;
    String::from_utf8(bytes).context("Delimited output is not valid UTF-8")
}

pub fn to_json(table: &CanonicalTable) -> Result<String> {
    serde_json::to_string_pretty(&table.records()).context("Serializing table rows to JSON")
}
