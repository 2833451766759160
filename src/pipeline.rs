//! Upload pipeline: format selection → size check → decode → inference.

use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use crate::{
    decode::{self, DecodeOptions},
    error::DecodeResult,
    format::FormatKind,
    io_utils,
    schema::{self, CanonicalTable, InferenceReport},
    shape::{self, ChartKind, ChartRecord},
    stats::{self, Kpis},
};

/// Everything derived from one successful upload.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: String,
    pub format: FormatKind,
    pub table: CanonicalTable,
    pub report: InferenceReport,
}

impl Dataset {
    pub fn chart(&self, kind: ChartKind) -> Vec<ChartRecord> {
        shape::shape(&self.table, kind)
    }

    pub fn kpis(&self) -> Kpis {
        stats::aggregate(&self.table)
    }

    pub fn charts(&self, kinds: &[ChartKind]) -> ChartSet {
        ChartSet {
            charts: kinds
                .iter()
                .map(|kind| (kind.as_str(), self.chart(*kind)))
                .collect(),
        }
    }
}

/// Chart name → records, in the requested order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub charts: Vec<(&'static str, Vec<ChartRecord>)>,
}

impl Serialize for ChartSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_map(self.charts.iter().map(|(name, records)| (*name, records)))
    }
}

/// Decodes an in-memory upload, selecting the decoder from `name`'s extension.
pub fn load_bytes(name: &str, bytes: &[u8], options: &DecodeOptions) -> DecodeResult<Dataset> {
    let format = FormatKind::from_path(Path::new(name))?;
    build(name, format, bytes, options)
}

/// Reads and decodes a file. The format is resolved before any content is read,
/// and the size cap is checked before decoding.
pub fn load_path(
    path: &Path,
    format_override: Option<FormatKind>,
    options: &DecodeOptions,
) -> DecodeResult<Dataset> {
    let format = match format_override {
        Some(format) => format,
        None => FormatKind::from_path(path)?,
    };
    let bytes = io_utils::read_input(path, options.max_bytes)?;
    build(&path.display().to_string(), format, &bytes, options)
}

fn build(
    source: &str,
    format: FormatKind,
    bytes: &[u8],
    options: &DecodeOptions,
) -> DecodeResult<Dataset> {
    let records = decode::decode(bytes, format, options).inspect_err(|err| {
        warn!("Rejected {source}: {err}");
    })?;
    let (table, report) = schema::infer_with_report(&records);
    if !report.coercion_failures.is_empty() {
        info!(
            "{} cell(s) in {source} could not be coerced and were default-filled",
            report.coercion_failures.len()
        );
    }
    info!(
        "Loaded {} row(s) across {} field(s) from {source} as {format}",
        table.row_count(),
        table.fields().len()
    );
    Ok(Dataset {
        source: source.to_string(),
        format,
        table,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::Value, error::DecodeError, schema::FieldKind};

    #[test]
    fn load_bytes_selects_decoder_by_extension() {
        let dataset = load_bytes("sales.csv", b"name,value\nA,10\nB,20\n", &DecodeOptions::default())
            .unwrap();
        assert_eq!(dataset.format, FormatKind::Csv);
        assert_eq!(dataset.table.fields()[1].kind, FieldKind::Numeric);
        assert_eq!(dataset.table.value(1, "value"), Some(&Value::Number(20.0)));
    }

    #[test]
    fn unsupported_extension_fails_before_decoding() {
        let err = load_bytes("setup.exe", b"MZ", &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFormat { .. }));
    }

    #[test]
    fn chart_set_serializes_as_named_map() {
        let dataset =
            load_bytes("a.csv", b"name,value\nA,1\n", &DecodeOptions::default()).unwrap();
        let json = serde_json::to_value(dataset.charts(&[ChartKind::Bar, ChartKind::Geo])).unwrap();
        assert_eq!(json["bar"][0]["name"], "A");
        assert!(json["geo"][0]["lat"].is_number());
    }
}
