// Path resolution for the file tools

use crate::error::{AppError, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Validate that `raw` is absolute and normalize it lexically.
///
/// `.` and `..` components are collapsed without touching the filesystem,
/// so the result is usable as a key for paths that do not exist yet.
pub fn resolve_path(raw: &str) -> Result<PathBuf> {
    if raw.is_empty() {
        return Err(AppError::validation("file_path is required."));
    }
    let path = Path::new(raw);
    if !path.is_absolute() {
        return Err(AppError::validation(
            "file path must be absolute, not relative",
        ));
    }
    let normalized = path
        .absolutize()
        .map_err(|e| AppError::validation(format!("Invalid file path {}: {}", raw, e)))?;
    Ok(normalized.into_owned())
}
