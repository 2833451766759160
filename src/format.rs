use std::{fmt, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// Input formats understood by the decoders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Csv,
    Tsv,
    Json,
    Text,
    Xml,
    /// `.xlsx`/`.xls`: accepted at the boundary and routed through the JSON decoder.
    Spreadsheet,
}

impl FormatKind {
    pub fn from_extension(extension: &str) -> Result<Self, DecodeError> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Ok(FormatKind::Csv),
            "tsv" => Ok(FormatKind::Tsv),
            "json" => Ok(FormatKind::Json),
            "txt" => Ok(FormatKind::Text),
            "xml" => Ok(FormatKind::Xml),
            "xlsx" | "xls" => Ok(FormatKind::Spreadsheet),
            other => Err(DecodeError::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }

    /// Selects the decoder from a file name. Only the extension is consulted.
    pub fn from_path(path: &Path) -> Result<Self, DecodeError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }

    pub fn delimiter(&self) -> Option<u8> {
        match self {
            FormatKind::Csv => Some(b','),
            FormatKind::Tsv => Some(b'\t'),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatKind::Csv => "csv",
            FormatKind::Tsv => "tsv",
            FormatKind::Json => "json",
            FormatKind::Text => "txt",
            FormatKind::Xml => "xml",
            FormatKind::Spreadsheet => "xlsx",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatKind {
    type Err = DecodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_extension(value.trim().trim_start_matches('.'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(
            FormatKind::from_path(Path::new("Sales.CSV")).unwrap(),
            FormatKind::Csv
        );
        assert_eq!(
            FormatKind::from_path(Path::new("report.tsv")).unwrap(),
            FormatKind::Tsv
        );
        assert_eq!(
            FormatKind::from_path(Path::new("book.xls")).unwrap(),
            FormatKind::Spreadsheet
        );
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = FormatKind::from_path(Path::new("setup.exe")).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnsupportedFormat { ref extension } if extension == "exe"
        ));
        assert!(FormatKind::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn from_str_accepts_leading_dot() {
        assert_eq!(".json".parse::<FormatKind>().unwrap(), FormatKind::Json);
        assert_eq!("txt".parse::<FormatKind>().unwrap(), FormatKind::Text);
    }
}
