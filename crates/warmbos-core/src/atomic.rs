//! Atomic JSON persistence.
//!
//! Writes go to a temp file in the target's directory, are synced, then
//! renamed over the target so readers see either the old or the new document.

use crate::{Result, WarmbosError};
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Read and parse a JSON file.
///
/// Returns `None` if the file doesn't exist, or an error if parsing fails.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(WarmbosError::io_with_path(e, path)),
    };

    let data = serde_json::from_str(&contents).map_err(|e| WarmbosError::Json {
        message: format!("Failed to parse {}: {}", path.display(), e),
        source: Some(e),
    })?;

    Ok(Some(data))
}

/// Write `data` as pretty-printed JSON to `path`, atomically.
///
/// Missing parent directories are created.
pub fn atomic_write_json<T: Serialize + ?Sized>(path: &Path, data: &T) -> Result<()> {
    let parent = path.parent().ok_or_else(|| WarmbosError::Config {
        message: format!("{} has no parent directory", path.display()),
    })?;
    fs::create_dir_all(parent).map_err(|e| WarmbosError::io_with_path(e, parent))?;

    let serialized = serde_json::to_string_pretty(data).map_err(|e| WarmbosError::Json {
        message: format!("Failed to serialize {}: {}", path.display(), e),
        source: Some(e),
    })?;

    let mut temp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".json.tmp")
        .tempfile_in(parent)
        .map_err(|e| WarmbosError::io_with_path(e, parent))?;

    temp.write_all(serialized.as_bytes())
        .and_then(|_| temp.write_all(b"\n"))
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| WarmbosError::io_with_path(e, temp.path()))?;

    temp.persist(path)
        .map_err(|e| WarmbosError::io_with_path(e.error, path))?;

    debug!("Atomically wrote {}", path.display());
    Ok(())
}
