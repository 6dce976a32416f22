//! Manifest parsing and management for unhacs.
//!
//! The manifest (`unhacs.toml`) is the single source of truth for which
//! add-ons should be installed. It is an ordered list of packages:
//!
//! ```toml
//! [[packages]]
//! name = "frontend-card"
//! repo = "someone/frontend-card"
//! category = "plugin"
//! installed_version = "v1.2"
//!
//! [[packages]]
//! name = "alarmo"
//! repo = "nielsfaber/alarmo"
//! category = "integration"
//! constraint = "v1.10.4"
//! ignored_versions = ["v1.10.5"]
//! ```
//!
//! - `constraint` is either an exact tag or `"latest"`; omitting it means `"latest"`
//! - `installed_version` is written by the sync engine and absent until the
//!   first successful install
//! - `ignored_versions` lists tags a `latest` constraint should skip
//!
//! Entry order is preserved across load and save, and package names are unique.
//!
//! # Submodules
//!
//! - `manifest_io`: loading and atomic saving
//! - `manifest_mutations`: adding, removing and updating packages

mod manifest_io;
mod manifest_mutations;


use crate::core::{PackageCategory, Result, UnhacsError};
use crate::source::RepoId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Version policy of a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VersionConstraint {
    /// Always follow the most recently published release
    #[default]
    Latest,
    /// Stay on exactly this tag
    Pinned(String),
}

impl VersionConstraint {
    /// The sentinel spelling of [`VersionConstraint::Latest`].
    pub const LATEST: &'static str = "latest";

    /// Whether this is the floating `latest` constraint.
    #[must_use]
    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }

    /// The pinned tag, if any.
    #[must_use]
    pub fn pinned(&self) -> Option<&str> {
        match self {
            Self::Latest => None,
            Self::Pinned(tag) => Some(tag),
        }
    }
}

/// Only the exact sentinel `latest` floats; any other text, whatever its
/// case or whitespace, is a tag and is kept verbatim.
impl From<String> for VersionConstraint {
    fn from(value: String) -> Self {
        if value == Self::LATEST {
            Self::Latest
        } else {
            Self::Pinned(value)
        }
    }
}

impl From<&str> for VersionConstraint {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<VersionConstraint> for String {
    fn from(constraint: VersionConstraint) -> Self {
        constraint.to_string()
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(Self::LATEST),
            Self::Pinned(tag) => f.write_str(tag),
        }
    }
}

/// A tracked add-on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Package {
    /// Unique name; also the directory name under the category's install dir
    pub name: String,

    /// Source repository
    pub repo: RepoId,

    /// Add-on category, which fixes the install location
    pub category: PackageCategory,

    /// Version policy
    #[serde(default, skip_serializing_if = "VersionConstraint::is_latest")]
    pub constraint: VersionConstraint,

    /// Tag currently installed, as recorded by the last successful sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_version: Option<String>,

    /// Tags a `latest` constraint never selects
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignored_versions: Vec<String>,
}

impl Package {
    /// A package following `latest`, named after its repository.
    pub fn new(repo: RepoId, category: PackageCategory) -> Self {
        Self {
            name: repo.name.clone(),
            repo,
            category,
            constraint: VersionConstraint::Latest,
            installed_version: None,
            ignored_versions: Vec::new(),
        }
    }

    /// Use `name` instead of the repository name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the version constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: impl Into<VersionConstraint>) -> Self {
        self.constraint = constraint.into();
        self
    }

    /// Directory this package installs into under `target_root`.
    #[must_use]
    pub fn destination(&self, target_root: &Path) -> PathBuf {
        self.category.destination(target_root, &self.name)
    }

    /// Whether `tag` is in the ignore list.
    #[must_use]
    pub fn is_ignored(&self, tag: &str) -> bool {
        self.ignored_versions.iter().any(|ignored| ignored == tag)
    }
}

/// Check that `name` is usable as a single directory name.
///
/// # Errors
///
/// Returns [`UnhacsError::InvalidPackageName`] for empty names, `.`/`..`, and
/// names containing separators or characters outside `[A-Za-z0-9._-]`.
pub fn validate_package_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(UnhacsError::InvalidPackageName {
            name: name.to_string(),
        })
    }
}

/// The ordered set of tracked packages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    packages: Vec<Package>,
}

impl Manifest {
    /// Create an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Packages in manifest order.
    #[must_use]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Look up a package by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Number of tracked packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether no package is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Check the invariants a loaded manifest must satisfy: valid, unique names.
    pub(crate) fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for package in &self.packages {
            validate_package_name(&package.name)?;
            if !seen.insert(package.name.as_str()) {
                return Err(UnhacsError::DuplicatePackage {
                    name: package.name.clone(),
                });
            }
        }
        Ok(())
    }
}
