//! Installation of fetched artifacts into the Home Assistant config tree.
//!
//! The installer turns the raw bytes of a release into the on-disk files of a
//! package, replacing any previous version wholesale. It is synchronous and
//! performs no network access; the sync engine runs it on a blocking thread.
//!
//! # Installation Process
//!
//! 1. **Classify**: sniff the artifact into a single file or a zip archive
//!    (see [`classify`]); empty or mislabelled artifacts fail here
//! 2. **Stage**: write or expand the artifact into a fresh staging directory
//!    inside `target_root`, so every later move is a same-filesystem rename
//! 3. **Locate**: pick the package root inside the staged tree, flattening a
//!    single top-level directory (see [`locate_package_root`])
//! 4. **Swap**: move the old destination aside, move the staged root into
//!    place, and move the old destination back if that fails
//! 5. **Clean up**: the staging directory, holding the previous version, is
//!    dropped on every path
//!
//! Steps 1 to 3 touch nothing outside the staging directory, so a failure there
//! leaves the installed package exactly as it was.
//!
//! # Concurrency
//!
//! Two installs of *different* packages may run at the same time; each gets its
//! own staging directory. Two installs targeting the same destination must not.

mod layout;


pub use layout::{ArtifactLayout, classify, extract_zip, locate_package_root};

use crate::constants::STAGING_PREFIX;
use crate::core::{Result, UnhacsError};
use crate::manifest::Package;
use crate::source::Artifact;
use crate::utils::fs::{StagingDir, ensure_dir, remove_dir_all, rename};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use walkdir::WalkDir;

/// What a successful [`install`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    /// Directory the package now lives in
    pub destination: PathBuf,
    /// How the artifact was laid out
    pub layout: ArtifactLayout,
    /// Number of files under `destination`
    pub files: usize,
    /// Whether an earlier install was replaced
    pub replaced: bool,
}

/// Install `artifact` as `package` under `target_root`.
///
/// On error the destination is left as it was before the call.
///
/// # Errors
///
/// - [`UnhacsError::EmptyArtifact`] when the artifact has no content
/// - [`UnhacsError::ExtractionFailed`] for malformed or unsafe archives
/// - [`UnhacsError::FilesystemError`] when staging or the final move fails
pub fn install(package: &Package, artifact: &Artifact, target_root: &Path) -> Result<InstallOutcome> {
    let layout = classify(&artifact.filename, &artifact.bytes)?;
    debug!("Installing {} from {} as {:?}", package.name, artifact.filename, layout);

    ensure_dir(target_root)?;
    let staging = StagingDir::new_in(target_root, STAGING_PREFIX)?;

    let staged_root = match layout {
        ArtifactLayout::SingleFile => stage_single_file(artifact, staging.path())?,
        ArtifactLayout::Archive => {
            let extracted = staging.path().join("extracted");
            let count = extract_zip(&artifact.filename, &artifact.bytes, &extracted)?;
            debug!("Extracted {} file(s) from {}", count, artifact.filename);
            locate_package_root(&extracted, package)?
        }
    };

    let destination = package.destination(target_root);
    if let Some(parent) = destination.parent() {
        ensure_dir(parent)?;
    }

    let replaced = swap_into_place(&staged_root, &destination, staging)?;
    let files = count_files(&destination);

    info!("Installed {} into {} ({} file(s))", package.name, destination.display(), files);
    Ok(InstallOutcome {
        destination,
        layout,
        files,
        replaced,
    })
}

/// Delete the installed files of `package`.
///
/// Returns `false` when nothing was installed.
///
/// # Errors
///
/// Returns [`UnhacsError::FilesystemError`] if the files cannot be removed.
pub fn uninstall(package: &Package, target_root: &Path) -> Result<bool> {
    let destination = package.destination(target_root);
    let Ok(metadata) = std::fs::symlink_metadata(&destination) else {
        return Ok(false);
    };

    if metadata.is_dir() {
        remove_dir_all(&destination)?;
    } else {
        std::fs::remove_file(&destination)
            .map_err(|e| UnhacsError::fs("removing", &destination, e))?;
    }
    info!("Removed {}", destination.display());
    Ok(true)
}

/// Whether `package` has files under `target_root`.
#[must_use]
pub fn is_installed(package: &Package, target_root: &Path) -> bool {
    std::fs::symlink_metadata(package.destination(target_root)).is_ok()
}

fn stage_single_file(artifact: &Artifact, staging: &Path) -> Result<PathBuf> {
    let file_name = Path::new(&artifact.filename)
        .file_name()
        .filter(|name| *name != "..")
        .ok_or_else(|| UnhacsError::ExtractionFailed {
            filename: artifact.filename.clone(),
            reason: "artifact has no usable file name".to_string(),
        })?;

    let root = staging.join("content");
    ensure_dir(&root)?;
    let path = root.join(file_name);
    std::fs::write(&path, &artifact.bytes).map_err(|e| UnhacsError::fs("writing", &path, e))?;
    Ok(root)
}

/// Move `staged` to `destination`, parking any existing destination inside
/// `staging` until the new content is in place.
///
/// Returns whether a previous install was replaced. If the previous install
/// cannot be moved back after a failed swap, `staging` is kept on disk so the
/// old files survive.
fn swap_into_place(staged: &Path, destination: &Path, staging: StagingDir) -> Result<bool> {
    let backup = staging.path().join("previous");
    let had_previous = std::fs::symlink_metadata(destination).is_ok();
    if had_previous {
        rename(destination, &backup)?;
    }

    if let Err(e) = rename(staged, destination) {
        if had_previous && let Err(restore) = rename(&backup, destination) {
            let kept = staging.persist();
            error!(
                "Could not restore previous install at {}; it is kept under {}: {}",
                destination.display(),
                kept.display(),
                restore
            );
        }
        return Err(e);
    }

    Ok(had_previous)
}

fn count_files(dir: &Path) -> usize {
    WalkDir::new(dir).into_iter().filter_map(std::result::Result::ok).filter(|e| e.file_type().is_file()).count()
}
