//! Mutation operations for the manifest.

use crate::core::{Result, UnhacsError};
use crate::manifest::{Manifest, Package, validate_package_name};

/// Maximum edit distance for a "did you mean" suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

impl Manifest {
    /// Append a package to the end of the manifest.
    ///
    /// # Errors
    ///
    /// - [`UnhacsError::InvalidPackageName`] if the name is unusable as a directory
    /// - [`UnhacsError::DuplicatePackage`] if the name is already tracked
    pub fn add_package(&mut self, package: Package) -> Result<()> {
        validate_package_name(&package.name)?;
        if self.get(&package.name).is_some() {
            return Err(UnhacsError::DuplicatePackage {
                name: package.name,
            });
        }
        self.packages.push(package);
        Ok(())
    }

    /// Remove a package by name, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`UnhacsError::PackageNotFound`], carrying the closest tracked
    /// name when one is within a small edit distance.
    pub fn remove_package(&mut self, name: &str) -> Result<Package> {
        match self.packages.iter().position(|p| p.name == name) {
            Some(index) => Ok(self.packages.remove(index)),
            None => Err(self.not_found(name)),
        }
    }

    /// Look up a package by name, failing with a suggestion if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`UnhacsError::PackageNotFound`] if no package has that name.
    pub fn require(&self, name: &str) -> Result<&Package> {
        self.get(name).ok_or_else(|| self.not_found(name))
    }

    /// Record that `version` of package `name` is now installed.
    ///
    /// # Errors
    ///
    /// Returns [`UnhacsError::PackageNotFound`] if no package has that name.
    pub fn record_installed(&mut self, name: &str, version: &str) -> Result<()> {
        match self.packages.iter_mut().find(|p| p.name == name) {
            Some(package) => {
                package.installed_version = Some(version.to_string());
                Ok(())
            }
            None => Err(self.not_found(name)),
        }
    }

    fn not_found(&self, name: &str) -> UnhacsError {
        let closest = self
            .packages
            .iter()
            .map(|p| (strsim::levenshtein(name, &p.name), &p.name))
            .filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, candidate)| candidate.clone());

        UnhacsError::PackageNotFound {
            name: name.to_string(),
            closest,
        }
    }
}
