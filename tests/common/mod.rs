#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chart_ingest::{
    decode::{DecodeOptions, decode},
    format::FormatKind,
    schema::{CanonicalTable, infer},
};
use tempfile::{TempDir, tempdir};

/// Absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Decodes `contents` as `format` and infers its table.
pub fn table_from(contents: &str, format: FormatKind) -> CanonicalTable {
    let records =
        decode(contents.as_bytes(), format, &DecodeOptions::default()).expect("decode input");
    infer(&records)
}

/// Scratch directory removed on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file");
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.temp_dir.path().join(name)).expect("read temp file")
    }
}
