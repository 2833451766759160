use crate::{
    data::{RawRecord, RawValue},
    error::{DecodeError, DecodeResult},
};

/// One record per non-blank line: `{id, content, length}`.
///
/// `id` counts kept lines from 1, `content` is the trimmed line and `length`
/// is the character count of the line before trimming.
pub fn decode(text: &str) -> DecodeResult<Vec<RawRecord>> {
    let records = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(idx, line)| {
            let mut record = RawRecord::new();
            record.insert("id", RawValue::Number((idx + 1) as f64));
            record.insert("content", RawValue::Text(line.trim().to_string()));
            record.insert("length", RawValue::Number(line.chars().count() as f64));
            record
        })
        .collect::<Vec<_>>();
    if records.is_empty() {
        return Err(DecodeError::EmptyFile);
    }
    Ok(records)
}
