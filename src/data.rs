//! Raw decoder output and typed cell values.
//!
//! [`RawRecord`] is what every format decoder produces: an ordered mapping
//! from field name to [`RawValue`], keeping the order in which fields were
//! first seen. [`Value`] is the typed cell stored in a
//! [`CanonicalTable`](crate::schema::CanonicalTable) once inference has fixed
//! each field's kind.

use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Largest magnitude rendered without a fractional part.
const INTEGRAL_DISPLAY_LIMIT: f64 = 1e15;

#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<RawValue>),
    Record(RawRecord),
}

impl RawValue {
    /// True for absent values and whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::List(items) => items.is_empty(),
            RawValue::Record(record) => record.is_empty(),
            RawValue::Bool(_) | RawValue::Number(_) => false,
        }
    }

    pub fn is_nested(&self) -> bool {
        matches!(self, RawValue::List(_) | RawValue::Record(_))
    }

    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => RawValue::Null,
            serde_json::Value::Bool(b) => RawValue::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(RawValue::Null, RawValue::Number),
            serde_json::Value::String(s) => RawValue::Text(s),
            serde_json::Value::Array(items) => {
                RawValue::List(items.into_iter().map(RawValue::from_json).collect())
            }
            serde_json::Value::Object(map) => RawValue::Record(RawRecord::from_json_map(map)),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            RawValue::Null => serde_json::Value::Null,
            RawValue::Bool(b) => serde_json::Value::Bool(*b),
            RawValue::Number(n) => number_to_json(*n),
            RawValue::Text(s) => serde_json::Value::String(s.clone()),
            RawValue::List(items) => {
                serde_json::Value::Array(items.iter().map(RawValue::to_json).collect())
            }
            RawValue::Record(record) => record.to_json(),
        }
    }
}

impl Serialize for RawValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            RawValue::Null => serializer.serialize_unit(),
            RawValue::Bool(b) => serializer.serialize_bool(*b),
            RawValue::Number(n) => serialize_number(*n, serializer),
            RawValue::Text(s) => serializer.serialize_str(s),
            RawValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            RawValue::Record(record) => record.serialize(serializer),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

/// Ordered field-name → value mapping produced by a decoder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    entries: Vec<(String, RawValue)>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `name`. A replaced field keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: RawValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Inserts `value`, turning an existing field into an ordered list when the
    /// name repeats. Used for sibling XML elements sharing a tag.
    pub fn append(&mut self, name: impl Into<String>, value: RawValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, RawValue::List(items))) => items.push(value),
            Some((_, slot)) => {
                let previous = std::mem::replace(slot, RawValue::Null);
                *slot = RawValue::List(vec![previous, value]);
            }
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn values(&self) -> impl Iterator<Item = &RawValue> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json_map(map: serde_json::Map<String, serde_json::Value>) -> Self {
        let mut record = RawRecord::new();
        for (key, value) in map {
            record.insert(key, RawValue::from_json(value));
        }
        record
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .entries
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

impl Serialize for RawRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<K: Into<String>> FromIterator<(K, RawValue)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, RawValue)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

/// A typed cell. The variant always matches the owning field's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Number(n) => number_to_json(*n),
            Value::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Number(n) => serialize_number(*n, serializer),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Parses trimmed text as a finite number.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Canonical text form of a number: integral values lose their fraction.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < INTEGRAL_DISPLAY_LIMIT {
        // `as i64` also folds -0.0 into "0"
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

/// Returns the number only when formatting it reproduces `value` exactly,
/// so `"10"` and `"2.5"` qualify while `"007"` and `"1e3"` stay text.
pub fn round_trip_number(value: &str) -> Option<f64> {
    let parsed = parse_number(value)?;
    (format_number(parsed) == value).then_some(parsed)
}

pub(crate) fn number_to_json(value: f64) -> serde_json::Value {
    if value.fract() == 0.0 && value.abs() < INTEGRAL_DISPLAY_LIMIT {
        serde_json::Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}

fn serialize_number<S>(value: f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.fract() == 0.0 && value.abs() < INTEGRAL_DISPLAY_LIMIT {
        serializer.serialize_i64(value as i64)
    } else {
        serializer.serialize_f64(value)
    }
}
