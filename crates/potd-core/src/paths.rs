//! Data directory and database path resolution.

use std::env;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    /// Could not determine the system data directory.
    #[error("Cannot determine system data directory")]
    NoDataDir,

    /// Failed to create a directory.
    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },
}

/// Get the root directory for application data.
///
/// Resolution order:
/// 1. `POTD_DATA_DIR` environment variable
/// 2. `<system data dir>/potd`
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(path) = env::var("POTD_DATA_DIR") {
        return Ok(PathBuf::from(path));
    }

    let root = dirs::data_local_dir()
        .ok_or(PathError::NoDataDir)?
        .join("potd");

    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| PathError::CreateFailed {
            path: root.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(root)
}

/// Get the path to the `SQLite` database file (`potd.db` in the data root).
pub fn database_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join("potd.db"))
}
