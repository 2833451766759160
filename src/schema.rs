//! Canonical table model and the type inference engine.
//!
//! This module owns [`CanonicalTable`] (the single tabular form every decoder
//! output is converted into), its [`FieldDescriptor`]s, and [`infer`], which
//! builds a table from a decoded record sequence.
//!
//! ## Inference rules
//!
//! - Column order is the union of field names in first-seen order.
//! - A field's [`FieldKind`] is decided once, from the first non-empty value
//!   seen for it: numeric when that value parses as a finite number,
//!   categorical otherwise. A field with no non-empty value is categorical.
//! - Every cell is then coerced to its field's kind. Numeric cells fall back to
//!   `0` and categorical cells to `""` when absent. A non-empty value that
//!   cannot be coerced is recorded as a [`CoercionFailure`] and default-filled;
//!   it never aborts inference.

use std::{collections::HashMap, fmt};

use log::debug;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

use crate::data::{RawRecord, RawValue, Value, format_number, parse_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Numeric,
    Categorical,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Numeric => "numeric",
            FieldKind::Categorical => "categorical",
        }
    }

    /// Default cell used for absent or uncoercible values.
    pub fn default_value(&self) -> Value {
        match self {
            FieldKind::Numeric => Value::Number(0.0),
            FieldKind::Categorical => Value::Text(String::new()),
        }
    }

    fn classify(value: &RawValue) -> Self {
        match value {
            RawValue::Number(_) => FieldKind::Numeric,
            RawValue::Text(text) if parse_number(text).is_some() => FieldKind::Numeric,
            _ => FieldKind::Categorical,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
}

/// One row of a [`CanonicalTable`]: exactly one cell per field, in field order.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRow {
    cells: Vec<Value>,
}

impl TypedRow {
    pub fn cells(&self) -> &[Value] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.cells.get(index)
    }
}

/// A cell value that could not be coerced to its field's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionFailure {
    /// Zero-based row index.
    pub row: usize,
    pub field: String,
    pub raw: String,
}

#[derive(Debug, Clone, Default)]
pub struct InferenceReport {
    pub rows_read: usize,
    pub coercion_failures: Vec<CoercionFailure>,
    sample_values: Vec<Option<String>>,
}

impl InferenceReport {
    /// First non-empty raw value seen for the field at `index`.
    pub fn sample_value(&self, index: usize) -> Option<&str> {
        self.sample_values.get(index).and_then(|v| v.as_deref())
    }
}

/// Ordered, typed, immutable table built once per upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalTable {
    fields: Vec<FieldDescriptor>,
    rows: Vec<TypedRow>,
}

impl CanonicalTable {
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn rows(&self) -> &[TypedRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn headers(&self) -> Vec<String> {
        self.fields.iter().map(|field| field.name.clone()).collect()
    }

    pub fn value(&self, row: usize, field: &str) -> Option<&Value> {
        let index = self.field_index(field)?;
        self.rows.get(row)?.get(index)
    }

    /// Indices of fields with the given kind, in column order.
    pub fn indices_of_kind(&self, kind: FieldKind) -> impl Iterator<Item = usize> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(move |(_, field)| field.kind == kind)
            .map(|(idx, _)| idx)
    }

    pub fn numeric_field_count(&self) -> usize {
        self.indices_of_kind(FieldKind::Numeric).count()
    }

    /// `(field name, cell)` pairs of one row, in column order.
    pub fn row_entries<'a>(
        &'a self,
        row: &'a TypedRow,
    ) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.fields
            .iter()
            .map(|field| field.name.as_str())
            .zip(row.cells.iter())
    }

    /// Serializable view of the rows as objects keyed by field name.
    pub fn records(&self) -> RowsView<'_> {
        RowsView { table: self }
    }
}

impl Serialize for CanonicalTable {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("CanonicalTable", 2)?;
        state.serialize_field("fields", &self.fields)?;
        state.serialize_field("rows", &self.records())?;
        state.end()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RowsView<'a> {
    table: &'a CanonicalTable,
}

impl Serialize for RowsView<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.table.rows.iter().map(|row| RowView {
            table: self.table,
            row,
        }))
    }
}

struct RowView<'a> {
    table: &'a CanonicalTable,
    row: &'a TypedRow,
}

impl Serialize for RowView<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.row.cells.len()))?;
        for (name, value) in self.table.row_entries(self.row) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Builds the canonical table for a decoded record sequence.
pub fn infer(records: &[RawRecord]) -> CanonicalTable {
    infer_with_report(records).0
}

pub fn infer_with_report(records: &[RawRecord]) -> (CanonicalTable, InferenceReport) {
    let names = collect_field_names(records);

    let mut samples: Vec<Option<&RawValue>> = vec![None; names.len()];
    for record in records {
        if samples.iter().all(Option::is_some) {
            break;
        }
        for (idx, name) in names.iter().enumerate() {
            if samples[idx].is_some() {
                continue;
            }
            if let Some(value) = record.get(name).filter(|value| !value.is_empty()) {
                samples[idx] = Some(value);
            }
        }
    }

    let fields = names
        .iter()
        .zip(&samples)
        .map(|(name, sample)| FieldDescriptor {
            name: name.clone(),
            kind: sample.map_or(FieldKind::Categorical, FieldKind::classify),
        })
        .collect::<Vec<_>>();

    let mut failures = Vec::new();
    let rows = records
        .iter()
        .enumerate()
        .map(|(row_idx, record)| {
            let cells = fields
                .iter()
                .map(|field| {
                    let raw = record.get(&field.name).unwrap_or(&RawValue::Null);
                    coerce(raw, field.kind).unwrap_or_else(|| {
                        let failure = CoercionFailure {
                            row: row_idx,
                            field: field.name.clone(),
                            raw: render_raw(raw),
                        };
                        debug!(
                            "Row {} field '{}': '{}' is not {}; using default",
                            row_idx + 1,
                            failure.field,
                            failure.raw,
                            field.kind
                        );
                        failures.push(failure);
                        field.kind.default_value()
                    })
                })
                .collect();
            TypedRow { cells }
        })
        .collect::<Vec<_>>();

    let report = InferenceReport {
        rows_read: records.len(),
        coercion_failures: failures,
        sample_values: samples
            .iter()
            .map(|sample| sample.map(render_raw))
            .collect(),
    };
    (CanonicalTable { fields, rows }, report)
}

fn collect_field_names(records: &[RawRecord]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut names = Vec::new();
    for record in records {
        for key in record.keys() {
            if !seen.contains_key(key) {
                seen.insert(key, names.len());
                names.push(key.to_string());
            }
        }
    }
    names
}

/// Coerces one raw value. `None` means the value is present but cannot be
/// represented in `kind`.
fn coerce(raw: &RawValue, kind: FieldKind) -> Option<Value> {
    match kind {
        FieldKind::Numeric => match raw {
            RawValue::Null => Some(Value::Number(0.0)),
            RawValue::Number(n) => Some(Value::Number(*n)),
            RawValue::Text(text) if text.trim().is_empty() => Some(Value::Number(0.0)),
            RawValue::Text(text) => parse_number(text).map(Value::Number),
            RawValue::Bool(_) | RawValue::List(_) | RawValue::Record(_) => None,
        },
        FieldKind::Categorical => Some(Value::Text(render_raw(raw))),
    }
}

fn render_raw(raw: &RawValue) -> String {
    match raw {
        RawValue::Null => String::new(),
        RawValue::Bool(b) => b.to_string(),
        RawValue::Number(n) => format_number(*n),
        RawValue::Text(text) => text.trim().to_string(),
        RawValue::List(_) | RawValue::Record(_) => raw.to_json().to_string(),
    }
}
