//! Read-only view of what is tracked and what is on disk.

use crate::core::PackageCategory;
use crate::installer;
use crate::manifest::{Manifest, VersionConstraint};
use crate::source::RepoId;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Current state of one tracked package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageStatus {
    pub name: String,
    pub repo: RepoId,
    pub category: PackageCategory,
    pub constraint: VersionConstraint,
    pub installed_version: Option<String>,
    /// Where the package installs under the target root
    pub destination: PathBuf,
    /// Whether anything exists at `destination`
    pub present: bool,
}

/// Status of every package in `manifest`, in manifest order.
///
/// Touches no network; only checks whether each destination exists.
pub fn list(manifest: &Manifest, target_root: &Path) -> Vec<PackageStatus> {
    manifest
        .packages()
        .iter()
        .map(|package| PackageStatus {
            name: package.name.clone(),
            repo: package.repo.clone(),
            category: package.category,
            constraint: package.constraint.clone(),
            installed_version: package.installed_version.clone(),
            destination: package.destination(target_root),
            present: installer::is_installed(package, target_root),
        })
        .collect()
}
