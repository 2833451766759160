//! JSON decoding.
//!
//! An array of objects is the tabular case: one record per object, keys in
//! document order. Anything else maps onto records with a fixed fallback so
//! inference always sees a record sequence:
//!
//! | input                   | records                          |
//! |-------------------------|----------------------------------|
//! | top-level object        | the object as a single record    |
//! | non-object array item   | `{ "value": item }`              |
//! | top-level scalar        | `{ "value": scalar }`            |
//!
//! Nested objects and arrays inside a record are kept as nested raw values.

use serde_json::Value as JsonValue;

use crate::{
    data::{RawRecord, RawValue},
    error::DecodeResult,
};

/// Field name used when a non-object JSON value is wrapped into a record.
pub const SCALAR_FIELD: &str = "value";

pub fn decode(text: &str) -> DecodeResult<Vec<RawRecord>> {
    let parsed: JsonValue = serde_json::from_str(text)?;
    Ok(match parsed {
        JsonValue::Array(items) => items.into_iter().map(into_record).collect(),
        other => vec![into_record(other)],
    })
}

fn into_record(value: JsonValue) -> RawRecord {
    match value {
        JsonValue::Object(map) => RawRecord::from_json_map(map),
        other => {
            let mut record = RawRecord::new();
            record.insert(SCALAR_FIELD, RawValue::from_json(other));
            record
        }
    }
}
