//! File access, size policy, and text decoding.
//!
//! All reads and writes of the CLI go through this module:
//!
//! - **Size cap**: inputs are measured before any content is read and rejected
//!   with [`DecodeError::TooLarge`] when they exceed the limit (50 MiB default).
//! - **Encoding**: bytes are decoded with `encoding_rs`, defaulting to UTF-8.
//!   A leading byte-order mark overrides the requested encoding.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.

use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

use crate::error::{DecodeError, DecodeResult};

/// Default upload cap: 50 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 50 * 1024 * 1024;

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn ensure_within_limit(size: u64, limit: u64) -> DecodeResult<()> {
    if size > limit {
        return Err(DecodeError::TooLarge { size, limit });
    }
    Ok(())
}

/// Reads a whole input, checking its length against `limit` first.
pub fn read_input(path: &Path, limit: u64) -> DecodeResult<Vec<u8>> {
    let io_error = |source| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    };
    if is_dash(path) {
        let mut buf = Vec::new();
        io::stdin()
            .lock()
            .take(limit.saturating_add(1))
            .read_to_end(&mut buf)
            .map_err(io_error)?;
        ensure_within_limit(buf.len() as u64, limit)?;
        return Ok(buf);
    }
    let metadata = std::fs::metadata(path).map_err(io_error)?;
    ensure_within_limit(metadata.len(), limit)?;
    std::fs::read(path).map_err(io_error)
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> DecodeResult<String> {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(DecodeError::Encoding {
            encoding: used.name(),
        })
    } else {
        Ok(text.into_owned())
    }
}

pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(io::stdout()),
    })
}

pub fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    let mut writer = open_output(path)?;
    writer.write_all(contents.as_bytes())?;
    if !contents.ends_with('\n') {
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
