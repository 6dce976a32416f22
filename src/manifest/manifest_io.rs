//! I/O operations for manifest files.

use crate::core::{Result, UnhacsError};
use crate::manifest::Manifest;
use crate::utils::fs::safe_write;
use std::path::Path;
use tracing::debug;

impl Manifest {
    /// Load and parse a manifest from a TOML file.
    ///
    /// # Errors
    ///
    /// - [`UnhacsError::ManifestNotFound`] when no file exists at `path`;
    ///   callers usually want [`Manifest::load_or_default`] instead
    /// - [`UnhacsError::ManifestCorrupt`] when the TOML does not match the schema
    ///   or a package name is unusable
    /// - [`UnhacsError::DuplicatePackage`] when two entries share a name
    /// - [`UnhacsError::FilesystemError`] for any other read failure
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use unhacs_cli::manifest::Manifest;
    /// use std::path::Path;
    ///
    /// let manifest = Manifest::load(Path::new("unhacs.toml"))?;
    /// println!("Tracking {} packages", manifest.len());
    /// # Ok::<(), unhacs_cli::core::UnhacsError>(())
    /// ```
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(UnhacsError::ManifestNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(UnhacsError::fs("reading manifest", path, e)),
        };

        let manifest: Self = toml::from_str(&content).map_err(|e| UnhacsError::ManifestCorrupt {
            file: path.display().to_string(),
            reason: e.message().to_string(),
        })?;

        manifest.validate().map_err(|e| match e {
            UnhacsError::InvalidPackageName { name } => UnhacsError::ManifestCorrupt {
                file: path.display().to_string(),
                reason: format!("invalid package name '{name}'"),
            },
            other => other,
        })?;

        debug!("Loaded {} package(s) from {}", manifest.len(), path.display());
        Ok(manifest)
    }

    /// Like [`Manifest::load`], but a missing file yields an empty manifest.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(UnhacsError::ManifestNotFound { .. }) => Ok(Self::new()),
            other => other,
        }
    }

    /// Save the manifest atomically.
    ///
    /// The content is written to a temporary sibling file and renamed over
    /// `path`, so an interrupted save leaves either the old or the new
    /// manifest, never a truncated one.
    ///
    /// # Errors
    ///
    /// Returns [`UnhacsError::FilesystemError`] if the write or rename fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| UnhacsError::ManifestCorrupt {
            file: path.display().to_string(),
            reason: format!("cannot serialize manifest: {e}"),
        })?;
        safe_write(path, &content)?;
        debug!("Saved {} package(s) to {}", self.len(), path.display());
        Ok(())
    }
}
