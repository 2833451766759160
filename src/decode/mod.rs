//! Format decoders.
//!
//! Each decoder turns the text of one upload into an ordered sequence of
//! [`RawRecord`]s. The entry points here apply the policies shared by every
//! format (size cap, text encoding, empty-input detection) before handing the
//! text to the format-specific module.

pub mod delimited;
pub mod json;
pub mod text;
pub mod xml;

use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{
    data::RawRecord,
    error::{DecodeError, DecodeResult},
    format::FormatKind,
    io_utils::{self, DEFAULT_MAX_BYTES},
};

#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    pub encoding: &'static Encoding,
    pub max_bytes: u64,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            encoding: UTF_8,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

/// Decodes raw upload bytes with the decoder selected by `format`.
pub fn decode(
    raw: &[u8],
    format: FormatKind,
    options: &DecodeOptions,
) -> DecodeResult<Vec<RawRecord>> {
    io_utils::ensure_within_limit(raw.len() as u64, options.max_bytes)?;
    let text = io_utils::decode_bytes(raw, options.encoding)?;
    decode_str(&text, format)
}

/// Decodes already-decoded text. Whitespace-only input is [`DecodeError::EmptyFile`]
/// regardless of format.
pub fn decode_str(text: &str, format: FormatKind) -> DecodeResult<Vec<RawRecord>> {
    if text.trim().is_empty() {
        return Err(DecodeError::EmptyFile);
    }
    let records = match format {
        FormatKind::Csv | FormatKind::Tsv => {
            let delimiter = format.delimiter().unwrap_or(b',');
            delimited::decode(text, delimiter)?
        }
        FormatKind::Json | FormatKind::Spreadsheet => json::decode(text)?,
        FormatKind::Text => text::decode(text)?,
        FormatKind::Xml => xml::decode(text)?,
    };
    debug!("Decoded {} record(s) as {}", records.len(), format);
    Ok(records)
}
