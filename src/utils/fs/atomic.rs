//! Atomic file write operations using temp-and-rename strategy.
//!
//! Writers never leave a truncated file behind: content goes to a sibling
//! temporary file first, is synced, and is then renamed over the target.

use crate::core::{Result, UnhacsError};
use crate::utils::fs::dirs::ensure_dir;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// 1. Writes content to a uniquely named temporary file next to `path`
/// 2. Syncs the temporary file to disk
/// 3. Renames the temporary file over `path`
///
/// The temporary file lives in the same directory so the rename never crosses
/// filesystems. It is removed if any step before the rename fails.
///
/// # Examples
///
/// ```rust,no_run
/// use unhacs_cli::utils::fs::atomic_write;
/// use std::path::Path;
///
/// # fn example() -> unhacs_cli::core::Result<()> {
/// atomic_write(Path::new("unhacs.toml"), b"packages = []\n")?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`UnhacsError::FilesystemError`] if the parent directory cannot be
/// created or any write, sync or rename fails.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }

    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()));

    let write_temp = || -> std::io::Result<()> {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(content)?;
        file.sync_all()
    };

    if let Err(e) = write_temp() {
        let _ = fs::remove_file(&temp_path);
        return Err(UnhacsError::fs("writing temporary file", &temp_path, e));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        UnhacsError::fs("renaming temporary file onto", path, e)
    })
}

/// Convenience wrapper around [`atomic_write`] for string content.
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}
