//! Durable local configuration: the credential record and config paths.
//!
//! Records are plain JSON files. Loads are tolerant (a missing or mangled
//! file reads as absent, never as an error); saves are atomic replacements so
//! a record is either the old value or the new one, never a torn write.

pub mod auth;
pub mod paths;

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::core::error::NwsError;

/// Serialize `value` as pretty JSON with a trailing newline and swap it into
/// place: write a temp file in the same directory, then rename over the
/// target.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), NwsError> {
    let json = format!("{}\n", serde_json::to_string_pretty(value)?);

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            NwsError::ValidationError(format!("Invalid config path: {}", path.display()))
        })?;
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}
