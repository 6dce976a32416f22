//! Version resolution.
//!
//! Picks the release a package should be at, given its constraint and the
//! releases its repository publishes. Resolution is pure: no I/O, no clock.
//!
//! # Policy
//!
//! - **latest**: the release with the most recent `published_at`. Releases
//!   that share a timestamp keep the source's order, so the one listed first
//!   wins. Undated releases count as older than any dated one.
//! - **pinned**: the unique release whose tag equals the pin exactly.
//!
//! Sources already list releases newest first, so for their output `latest`
//! is simply the first entry. No secondary sort key is ever applied.

use crate::core::{Result, UnhacsError};
use crate::manifest::{Package, VersionConstraint};
use crate::source::Release;

/// Select the release matching `constraint` from `available`.
///
/// # Errors
///
/// - [`UnhacsError::NoReleasesAvailable`] for `latest` over an empty slice
/// - [`UnhacsError::PinnedVersionNotFound`] when no tag matches a pin
///
/// # Examples
///
/// ```rust,no_run
/// use unhacs_cli::manifest::VersionConstraint;
/// use unhacs_cli::resolver::resolve;
/// use unhacs_cli::source::Release;
///
/// let releases = vec![Release::new("v1.2", None), Release::new("v1.0", None)];
/// let chosen = resolve(&VersionConstraint::Latest, &releases).unwrap();
/// assert_eq!(chosen.tag, "v1.2");
/// ```
pub fn resolve<'a>(constraint: &VersionConstraint, available: &'a [Release]) -> Result<&'a Release> {
    match constraint {
        VersionConstraint::Latest => most_recent(available.iter()),
        VersionConstraint::Pinned(tag) => {
            available.iter().find(|release| release.tag == *tag).ok_or_else(|| {
                UnhacsError::PinnedVersionNotFound {
                    version: tag.clone(),
                }
            })
        }
    }
}

/// Like [`resolve`], honouring the package's ignored versions.
///
/// Ignored tags are only skipped under `latest`; an explicit pin always wins.
pub fn resolve_package<'a>(package: &Package, available: &'a [Release]) -> Result<&'a Release> {
    match &package.constraint {
        VersionConstraint::Latest if !package.ignored_versions.is_empty() => {
            most_recent(available.iter().filter(|release| !package.is_ignored(&release.tag)))
        }
        constraint => resolve(constraint, available),
    }
}

fn most_recent<'a>(releases: impl Iterator<Item = &'a Release>) -> Result<&'a Release> {
    releases
        .fold(None, |best: Option<&Release>, candidate| match best {
            Some(current) if candidate.published_at <= current.published_at => Some(current),
            _ => Some(candidate),
        })
        .ok_or(UnhacsError::NoReleasesAvailable)
}
