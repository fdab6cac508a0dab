//! Locating recording files on disk

use std::path::{Path, PathBuf};

use crate::error::{FitlogError, Result};

/// Device mounts keep activities here, next to `Monitor/`
pub const ACTIVITY_SUBDIR: &str = "Activity";

/// The directory to walk for a source.
///
/// Uses `source/Activity` when present, otherwise `source` itself.
pub fn resolve_activity_dir(source: &Path) -> Result<PathBuf> {
    if !source.is_dir() {
        return Err(FitlogError::config(format!(
            "source directory not found: {}",
            source.display()
        )));
    }

    let nested = source.join(ACTIVITY_SUBDIR);
    if nested.is_dir() {
        Ok(nested)
    } else {
        Ok(source.to_path_buf())
    }
}

/// Regular, non-hidden files in `dir`, sorted by name
pub fn list_recordings(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        FitlogError::config(format!("cannot read {}: {}", dir.display(), e))
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if hidden || !entry.file_type()?.is_file() {
            continue;
        }
        files.push(entry.path());
    }

    files.sort();
    Ok(files)
}
