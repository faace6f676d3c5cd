//! JSON file input and atomic output
//!
//! Output is written to `<file>.tmp` next to the target and renamed into
//! place, so an aborted run never leaves a half-written file behind.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read and decode a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Err(Error::NotFound(path.display().to_string()));
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| Error::JsonFile {
        path: path.to_path_buf(),
        source,
    })
}

fn temp_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target.with_file_name(name)
}

/// Pretty-print `value` to `path`, creating parent directories
pub fn write_json_atomic<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    let tmp = temp_path(path);
    fs::write(&tmp, json.as_bytes())?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    debug!(path = %path.display(), bytes = json.len(), "Wrote JSON file");
    Ok(())
}
