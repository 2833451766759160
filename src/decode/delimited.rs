//! CSV/TSV decoding.
//!
//! The first non-blank line is the header. Quoted fields may contain the
//! delimiter. Every header and cell is trimmed and stripped of surrounding
//! quotes; rows whose cells are all empty are dropped. A cell whose text
//! survives a number round trip (`"10"`, `"2.5"`) is stored as a number.

use crate::{
    data::{RawRecord, RawValue, round_trip_number},
    error::{DecodeError, DecodeResult},
};

pub fn decode(text: &str, delimiter: u8) -> DecodeResult<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut headers: Option<Vec<String>> = None;
    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|source| DecodeError::Delimited {
            record: idx + 1,
            source,
        })?;
        let cells = record.iter().map(clean_cell).collect::<Vec<_>>();
        if cells.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        match &headers {
            None => headers = Some(header_names(&cells)),
            Some(names) => records.push(build_record(names, &cells)),
        }
    }

    if headers.is_none() {
        return Err(DecodeError::EmptyFile);
    }
    Ok(records)
}

fn clean_cell(raw: &str) -> &str {
    let trimmed = raw.trim();
    let unquoted = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let unquoted = unquoted.strip_suffix('"').unwrap_or(unquoted);
    unquoted.trim()
}

fn header_names(cells: &[&str]) -> Vec<String> {
    cells
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            if cell.is_empty() {
                format!("field_{}", idx + 1)
            } else {
                cell.to_string()
            }
        })
        .collect()
}

/// Short rows are padded with absent values; cells past the header are ignored.
fn build_record(headers: &[String], cells: &[&str]) -> RawRecord {
    let mut record = RawRecord::new();
    for (idx, name) in headers.iter().enumerate() {
        let value = cells.get(idx).map_or(RawValue::Null, |cell| cell_value(cell));
        record.insert(name.as_str(), value);
    }
    record
}

fn cell_value(cell: &str) -> RawValue {
    if cell.is_empty() {
        return RawValue::Null;
    }
    match round_trip_number(cell) {
        Some(number) => RawValue::Number(number),
        None => RawValue::Text(cell.to_string()),
    }
}
