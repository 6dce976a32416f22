//! Directory operations for creating and removing directories.

use crate::core::{Result, UnhacsError};
use std::fs;
use std::path::Path;

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// # Errors
///
/// Returns [`UnhacsError::FilesystemError`] if creation fails or the path
/// exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| UnhacsError::fs("creating directory", path, e))?;
    } else if !path.is_dir() {
        return Err(UnhacsError::fs(
            "creating directory",
            path,
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "path exists but is not a directory"),
        ));
    }
    Ok(())
}

/// Removes a directory and all its contents. A missing directory is not an error.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(UnhacsError::fs("removing directory", path, e)),
    }
}

/// Renames `from` to `to`, mapping failures to [`UnhacsError::FilesystemError`].
pub fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to).map_err(|e| UnhacsError::fs(format!("moving {} to", from.display()), to, e))
}
