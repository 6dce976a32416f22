//! Staging directories with RAII cleanup.

use crate::utils::fs::dirs::{ensure_dir, remove_dir_all};
use crate::core::Result;
use std::path::{Path, PathBuf};

/// A temporary directory that is removed when dropped.
///
/// Unlike a directory under the system temp dir, a `StagingDir` is created
/// inside a caller-chosen parent. Placing it on the same filesystem as the
/// final destination keeps every later move a plain `rename`.
///
/// # Examples
///
/// ```rust,no_run
/// use unhacs_cli::utils::fs::StagingDir;
/// use std::path::Path;
///
/// # fn example() -> unhacs_cli::core::Result<()> {
/// {
///     let staging = StagingDir::new_in(Path::new("/config"), ".unhacs-staging")?;
///     std::fs::write(staging.path().join("file.txt"), "temporary data").unwrap();
/// } // removed here, even on early return or panic
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
    keep: bool,
}

impl StagingDir {
    /// Create `{parent}/{prefix}-{uuid}`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::core::UnhacsError::FilesystemError`] if the directory
    /// cannot be created.
    pub fn new_in(parent: &Path, prefix: &str) -> Result<Self> {
        let path = parent.join(format!("{prefix}-{}", uuid::Uuid::new_v4()));
        ensure_dir(&path)?;
        Ok(Self {
            path,
            keep: false,
        })
    }

    /// Path to the staging directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Disable cleanup and return the path, leaving the directory on disk.
    pub fn persist(mut self) -> PathBuf {
        self.keep = true;
        self.path.clone()
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.keep {
            return;
        }
        if let Err(e) = remove_dir_all(&self.path) {
            tracing::warn!("Failed to clean up staging directory: {}", e);
        }
    }
}
