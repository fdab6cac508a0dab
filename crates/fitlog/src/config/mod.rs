use crate::error::{FitlogError, Result};
use std::path::{Path, PathBuf};

/// Default data directory name
const DATA_DIR_NAME: &str = "fitlog";

/// Database file name inside the data directory
pub const DB_FILE_NAME: &str = "fitdata.db";

/// Where recordings are read from when no source is given
pub const DEFAULT_SOURCE_DIR: &str = "FitFiles";

/// Get the data directory path for the database
/// Returns ~/.local/share/fitlog on Unix, ~/Library/Application Support/fitlog on macOS
pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join(DATA_DIR_NAME))
        .ok_or_else(|| FitlogError::config("Could not determine data directory"))
}

/// Default database location
pub fn default_db_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(DB_FILE_NAME))
}

/// Database path from `--db`, falling back to the default, with its parent
/// directory created
pub fn resolve_db_path(explicit: Option<&str>) -> Result<PathBuf> {
    let path = match explicit {
        Some(p) if !p.trim().is_empty() => PathBuf::from(p),
        Some(_) => return Err(FitlogError::config("Database path is empty")),
        None => default_db_path()?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    Ok(path)
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| {
            FitlogError::config(format!("Cannot create {}: {}", path.display(), e))
        })?;
    }
    Ok(())
}
