//! Chart data shaping.
//!
//! Every shaper is a pure function of a [`CanonicalTable`]: same table, same
//! output, no hidden state. All of them read the label and measures through
//! [`FieldSelection`], the one place that decides which columns feed a chart.

use std::fmt;

use clap::ValueEnum;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::{
    data::Value,
    schema::{CanonicalTable, FieldKind, TypedRow},
};

/// Rows used by bar, line, area, combo and scatter charts, and by the KPIs.
pub const GENERIC_WINDOW: usize = 10;
pub const PIE_WINDOW: usize = 6;
pub const WATERFALL_WINDOW: usize = 6;
pub const GEO_WINDOW: usize = 5;

const GEO_ORIGIN: (f64, f64) = (40.7128, -74.0060);
const GEO_LAT_STEP: f64 = 2.0;
const GEO_LNG_STEP: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[value(rename_all = "kebab-case")]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Area,
    Pie,
    Combo,
    Scatter,
    Waterfall,
    Geo,
}

impl ChartKind {
    pub const ALL: [ChartKind; 8] = [
        ChartKind::Bar,
        ChartKind::Line,
        ChartKind::Area,
        ChartKind::Pie,
        ChartKind::Combo,
        ChartKind::Scatter,
        ChartKind::Waterfall,
        ChartKind::Geo,
    ];

    pub fn window(&self) -> usize {
        match self {
            ChartKind::Pie => PIE_WINDOW,
            ChartKind::Waterfall => WATERFALL_WINDOW,
            ChartKind::Geo => GEO_WINDOW,
            _ => GENERIC_WINDOW,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Area => "area",
            ChartKind::Pie => "pie",
            ChartKind::Combo => "combo",
            ChartKind::Scatter => "scatter",
            ChartKind::Waterfall => "waterfall",
            ChartKind::Geo => "geo",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which columns a chart reads.
///
/// The rule is positional: the first categorical field is the label, the first
/// two numeric fields are `value` and `value2`. A missing measure reads as `0`
/// and a missing or empty label reads as `Item <n>`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldSelection {
    pub label: Option<usize>,
    pub value: Option<usize>,
    pub value2: Option<usize>,
}

impl FieldSelection {
    pub fn select(table: &CanonicalTable) -> Self {
        let mut numeric = table.indices_of_kind(FieldKind::Numeric);
        Self {
            label: table.indices_of_kind(FieldKind::Categorical).next(),
            value: numeric.next(),
            value2: numeric.next(),
        }
    }

    pub fn label(&self, row_index: usize, row: &TypedRow) -> String {
        self.label
            .and_then(|idx| row.get(idx))
            .and_then(Value::as_str)
            .filter(|label| !label.is_empty())
            .map_or_else(|| format!("Item {}", row_index + 1), str::to_string)
    }

    pub fn value(&self, row: &TypedRow) -> f64 {
        measure(self.value, row)
    }

    pub fn value2(&self, row: &TypedRow) -> f64 {
        measure(self.value2, row)
    }
}

fn measure(index: Option<usize>, row: &TypedRow) -> f64 {
    index
        .and_then(|idx| row.get(idx))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

/// `{name, value, value2, ...original fields}`. Projected keys take precedence
/// over original fields of the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRecord {
    pub name: String,
    pub value: f64,
    pub value2: f64,
    pub fields: Vec<(String, Value)>,
}

impl SeriesRecord {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    fn serialize_into<M: SerializeMap>(&self, map: &mut M, reserved: &[&str]) -> Result<(), M::Error> {
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("value", &Value::Number(self.value))?;
        map.serialize_entry("value2", &Value::Number(self.value2))?;
        for (key, value) in &self.fields {
            if reserved.contains(&key.as_str()) {
                continue;
            }
            map.serialize_entry(key, value)?;
        }
        Ok(())
    }
}

const SERIES_KEYS: &[&str] = &["name", "value", "value2"];
const SCATTER_KEYS: &[&str] = &["name", "value", "value2", "x", "y"];

impl Serialize for SeriesRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        self.serialize_into(&mut map, SERIES_KEYS)?;
        map.end()
    }
}

/// A series record plus `x = value`, `y = value2`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub series: SeriesRecord,
}

impl Serialize for ScatterPoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("x", &Value::Number(self.x))?;
        map.serialize_entry("y", &Value::Number(self.y))?;
        self.series.serialize_into(&mut map, SCATTER_KEYS)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterfallStep {
    pub name: String,
    pub value: f64,
    pub start: f64,
    pub end: f64,
    pub cumulative: f64,
}

/// Placeholder map marker; coordinates come from the row index, not geocoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub name: String,
    pub value: f64,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartRecord {
    Series(SeriesRecord),
    Scatter(ScatterPoint),
    Waterfall(WaterfallStep),
    Geo(GeoPoint),
}

pub fn shape(table: &CanonicalTable, kind: ChartKind) -> Vec<ChartRecord> {
    match kind {
        ChartKind::Bar | ChartKind::Line | ChartKind::Area | ChartKind::Combo | ChartKind::Pie => {
            series(table, kind.window())
                .into_iter()
                .map(ChartRecord::Series)
                .collect()
        }
        ChartKind::Scatter => scatter(table)
            .into_iter()
            .map(ChartRecord::Scatter)
            .collect(),
        ChartKind::Waterfall => waterfall(table)
            .into_iter()
            .map(ChartRecord::Waterfall)
            .collect(),
        ChartKind::Geo => geo(table).into_iter().map(ChartRecord::Geo).collect(),
    }
}

/// Projects the first `window` rows into series records.
pub fn series(table: &CanonicalTable, window: usize) -> Vec<SeriesRecord> {
    let selection = FieldSelection::select(table);
    table
        .rows()
        .iter()
        .take(window)
        .enumerate()
        .map(|(idx, row)| SeriesRecord {
            name: selection.label(idx, row),
            value: selection.value(row),
            value2: selection.value2(row),
            fields: table
                .row_entries(row)
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        })
        .collect()
}

pub fn scatter(table: &CanonicalTable) -> Vec<ScatterPoint> {
    series(table, ChartKind::Scatter.window())
        .into_iter()
        .map(|series| ScatterPoint {
            x: series.value,
            y: series.value2,
            series,
        })
        .collect()
}

/// Running sum over the first rows in table order; `start` of each step is
/// the `end` of the previous one.
pub fn waterfall(table: &CanonicalTable) -> Vec<WaterfallStep> {
    let selection = FieldSelection::select(table);
    let mut cumulative = 0.0;
    table
        .rows()
        .iter()
        .take(WATERFALL_WINDOW)
        .enumerate()
        .map(|(idx, row)| {
            let value = selection.value(row);
            let start = cumulative;
            cumulative += value;
            WaterfallStep {
                name: selection.label(idx, row),
                value,
                start,
                end: cumulative,
                cumulative,
            }
        })
        .collect()
}

pub fn geo(table: &CanonicalTable) -> Vec<GeoPoint> {
    let selection = FieldSelection::select(table);
    table
        .rows()
        .iter()
        .take(GEO_WINDOW)
        .enumerate()
        .map(|(idx, row)| {
            let (lat, lng) = placeholder_coordinates(idx);
            GeoPoint {
                name: selection.label(idx, row),
                value: selection.value(row),
                lat,
                lng,
            }
        })
        .collect()
}

pub fn placeholder_coordinates(index: usize) -> (f64, f64) {
    let offset = index as f64 - 2.0;
    (
        GEO_ORIGIN.0 + offset * GEO_LAT_STEP,
        GEO_ORIGIN.1 + offset * GEO_LNG_STEP,
    )
}

/// The `value` projection over the generic window.
pub fn value_window(table: &CanonicalTable) -> Vec<f64> {
    let selection = FieldSelection::select(table);
    table
        .rows()
        .iter()
        .take(GENERIC_WINDOW)
        .map(|row| selection.value(row))
        .collect()
}
