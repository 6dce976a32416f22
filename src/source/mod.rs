//! Remote source access.
//!
//! A [`SourceClient`] answers two questions about a repository: which releases
//! exist ([`SourceClient::list_versions`]) and what the artifact of one of them
//! contains ([`SourceClient::fetch`]). The rest of the crate depends only on
//! this trait; [`GitHubClient`] is the production implementation.
//!
//! Clients never retry. They report [`UnhacsError::SourceUnavailable`] for
//! transport problems (safe to retry) and a not-found variant for everything
//! that will not change on a second attempt.

mod github;

pub use github::GitHubClient;

use crate::core::{Result, UnhacsError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A repository on the hosting service, in `owner/repo` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoId {
    /// Account or organisation owning the repository
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoId {
    /// Build from already-validated parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepoId {
    type Err = UnhacsError;

    /// Accepts `owner/repo`, `https://github.com/owner/repo`, `github.com/owner/repo`,
    /// each optionally followed by `.git` or `/`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || UnhacsError::InvalidRepo {
            repo: s.to_string(),
        };

        let trimmed = s.trim();
        let without_scheme = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))
            .unwrap_or(trimmed);
        let path = without_scheme.strip_prefix("github.com/").unwrap_or(without_scheme);
        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        let mut parts = path.split('/');
        let (Some(owner), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };

        let valid_part = |part: &str| {
            !part.is_empty()
                && part != "."
                && part != ".."
                && part.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };
        if !valid_part(owner) || !valid_part(name) {
            return Err(invalid());
        }

        Ok(Self::new(owner, name))
    }
}

impl TryFrom<String> for RepoId {
    type Error = UnhacsError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RepoId> for String {
    fn from(repo: RepoId) -> Self {
        repo.to_string()
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A published version of a repository.
///
/// Releases are transient: produced by [`SourceClient::list_versions`], consumed
/// by the resolver, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Version tag, e.g. `v1.2.0`
    pub tag: String,
    /// Publication time; `None` for releases the service has not dated
    pub published_at: Option<DateTime<Utc>>,
    /// Files attached to the release
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// A release with no assets.
    pub fn new(tag: impl Into<String>, published_at: Option<DateTime<Utc>>) -> Self {
        Self {
            tag: tag.into(),
            published_at,
            assets: Vec::new(),
        }
    }
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseAsset {
    /// File name as published
    pub name: String,
    /// Direct download URL
    pub download_url: String,
}

/// Raw content of a release plus the filename it was declared under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Declared filename; drives archive detection
    pub filename: String,
    /// Downloaded bytes
    pub bytes: Vec<u8>,
}

/// Read access to a remote hosting service.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// List the releases of `repo`, most recently published first.
    ///
    /// An existing repository without releases yields an empty vector.
    ///
    /// # Errors
    ///
    /// - [`UnhacsError::RepoNotFound`] when the repository does not exist
    /// - [`UnhacsError::SourceUnavailable`] on transport failure or timeout
    async fn list_versions(&self, repo: &RepoId) -> Result<Vec<Release>>;

    /// Download the artifact of the release tagged `version`.
    ///
    /// # Errors
    ///
    /// - [`UnhacsError::VersionNotFound`] when the tag no longer exists
    /// - [`UnhacsError::SourceUnavailable`] on transport failure or timeout
    async fn fetch(&self, repo: &RepoId, version: &str) -> Result<Artifact>;
}
