//! Error types for file ingestion.
//!
//! Every variant of [`DecodeError`] aborts the upload it belongs to. Per-cell
//! coercion problems are not errors; see [`crate::schema::CoercionFailure`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort decoding of a single upload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file extension does not map to a known decoder.
    #[error("unsupported file format '{extension}' (expected csv, tsv, json, txt, xml, xlsx or xls)")]
    UnsupportedFormat { extension: String },

    /// No usable content after trimming.
    #[error("file is empty")]
    EmptyFile,

    /// Malformed JSON payload.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Malformed XML payload.
    #[error("invalid XML at byte {position}: {message}")]
    InvalidXml { position: u64, message: String },

    /// Input exceeds the configured size cap.
    #[error("file is {size} bytes which exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    /// Bytes could not be decoded with the requested encoding.
    #[error("failed to decode text with encoding {encoding}")]
    Encoding { encoding: &'static str },

    /// The delimited record reader failed part-way through.
    #[error("failed to read delimited record {record}: {source}")]
    Delimited {
        record: usize,
        #[source]
        source: csv::Error,
    },

    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DecodeError {
    /// Short machine-friendly name of the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::UnsupportedFormat { .. } => "unsupported_format",
            DecodeError::EmptyFile => "empty_file",
            DecodeError::InvalidJson(_) => "invalid_json",
            DecodeError::InvalidXml { .. } => "invalid_xml",
            DecodeError::TooLarge { .. } => "too_large",
            DecodeError::Encoding { .. } => "encoding",
            DecodeError::Delimited { .. } => "delimited",
            DecodeError::Io { .. } => "io",
        }
    }
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
