//! Error handling for unhacs
//!
//! The error system has two layers:
//! 1. [`UnhacsError`], a strongly-typed enum returned by every core component
//!    (manifest store, source client, resolver, installer, sync engine)
//! 2. [`ErrorContext`], a display wrapper that adds details and an actionable
//!    suggestion for CLI users
//!
//! # Error Categories
//!
//! Every [`UnhacsError`] maps onto one [`ErrorKind`]:
//! - **NotFound**: [`UnhacsError::ManifestNotFound`], [`UnhacsError::RepoNotFound`],
//!   [`UnhacsError::VersionNotFound`], [`UnhacsError::PinnedVersionNotFound`], ...
//! - **Corrupt**: [`UnhacsError::ManifestCorrupt`], [`UnhacsError::ExtractionFailed`], ...
//! - **Unavailable**: [`UnhacsError::SourceUnavailable`]
//! - **Conflict**: [`UnhacsError::DuplicatePackage`]
//! - **Filesystem**: [`UnhacsError::FilesystemError`]
//!
//! Only `Unavailable` errors are worth retrying; see [`UnhacsError::is_retryable`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use unhacs_cli::core::{ErrorKind, UnhacsError};
//!
//! let error = UnhacsError::RepoNotFound {
//!     repo: "someone/missing".to_string(),
//! };
//! assert_eq!(error.kind(), ErrorKind::NotFound);
//! assert!(!error.is_retryable());
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used by the core pipeline.
pub type Result<T, E = UnhacsError> = std::result::Result<T, E>;

/// The main error type for unhacs operations.
///
/// Variants carry enough context (paths, repositories, tags) to render a useful
/// message without the caller re-attaching it.
#[derive(Error, Debug)]
pub enum UnhacsError {
    /// No manifest file exists at the given path.
    ///
    /// Callers treat this as an empty manifest rather than a fatal error.
    #[error("Manifest not found: {path}")]
    ManifestNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// The manifest exists but does not parse into the expected schema.
    #[error("Manifest is corrupt ({file}): {reason}")]
    ManifestCorrupt {
        /// Path of the manifest file
        file: String,
        /// Parser message
        reason: String,
    },

    /// Two packages share the same name.
    #[error("Package '{name}' is already tracked")]
    DuplicatePackage {
        /// The duplicated package name
        name: String,
    },

    /// No tracked package has the given name.
    #[error("Package '{name}' is not tracked")]
    PackageNotFound {
        /// The requested name
        name: String,
        /// Closest tracked name, if any
        closest: Option<String>,
    },

    /// A package name cannot be used as a directory name.
    #[error("Invalid package name '{name}'")]
    InvalidPackageName {
        /// The rejected name
        name: String,
    },

    /// A repository identifier is not in `owner/repo` form.
    #[error("Invalid repository '{repo}': expected owner/repo or a GitHub URL")]
    InvalidRepo {
        /// The rejected input
        repo: String,
    },

    /// A category string is not one of the supported categories.
    #[error("Invalid category '{category}'")]
    InvalidCategory {
        /// The rejected input
        category: String,
    },

    /// The source client cannot be built from the configured settings.
    ///
    /// Never retried: the same settings fail the same way.
    #[error("Invalid source configuration: {reason}")]
    InvalidSourceConfig {
        /// What is wrong with the settings
        reason: String,
    },

    /// Network or transport failure while talking to the remote source.
    ///
    /// Safe to retry.
    #[error("Source unavailable for {repo}: {reason}")]
    SourceUnavailable {
        /// Repository being queried
        repo: String,
        /// Transport-level reason
        reason: String,
    },

    /// The remote repository does not exist.
    #[error("Repository not found: {repo}")]
    RepoNotFound {
        /// Repository being queried
        repo: String,
    },

    /// The requested tag vanished between listing and fetching.
    #[error("Version {version} not found in {repo}")]
    VersionNotFound {
        /// Repository being queried
        repo: String,
        /// Tag that was requested
        version: String,
    },

    /// A `latest` constraint was resolved against an empty release list.
    #[error("No releases available")]
    NoReleasesAvailable,

    /// A pinned constraint has no matching release tag.
    #[error("Pinned version {version} not found")]
    PinnedVersionNotFound {
        /// The pinned tag
        version: String,
    },

    /// A downloaded archive could not be expanded.
    #[error("Extraction failed for {filename}: {reason}")]
    ExtractionFailed {
        /// Declared artifact filename
        filename: String,
        /// What went wrong
        reason: String,
    },

    /// I/O failure while staging or installing files.
    #[error("Filesystem error while {operation} {path}: {source}")]
    FilesystemError {
        /// What was being done
        operation: String,
        /// Path involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The fetched artifact had no content.
    #[error("Artifact {filename} is empty")]
    EmptyArtifact {
        /// Declared artifact filename
        filename: String,
    },
}

/// Coarse error taxonomy used for exit codes and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Something that was asked for does not exist
    NotFound,
    /// Content could not be parsed or expanded
    Corrupt,
    /// Transport or network failure
    Unavailable,
    /// The operation clashes with existing state
    Conflict,
    /// Local I/O failure
    Filesystem,
}

impl UnhacsError {
    /// Build a [`UnhacsError::FilesystemError`] from an I/O error.
    pub fn fs(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FilesystemError {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Map this error onto the coarse taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ManifestNotFound { .. }
            | Self::PackageNotFound { .. }
            | Self::RepoNotFound { .. }
            | Self::VersionNotFound { .. }
            | Self::NoReleasesAvailable
            | Self::PinnedVersionNotFound { .. } => ErrorKind::NotFound,
            Self::ManifestCorrupt { .. }
            | Self::InvalidPackageName { .. }
            | Self::InvalidRepo { .. }
            | Self::InvalidCategory { .. }
            | Self::InvalidSourceConfig { .. }
            | Self::ExtractionFailed { .. }
            | Self::EmptyArtifact { .. } => ErrorKind::Corrupt,
            Self::SourceUnavailable { .. } => ErrorKind::Unavailable,
            Self::DuplicatePackage { .. } => ErrorKind::Conflict,
            Self::FilesystemError { .. } => ErrorKind::Filesystem,
        }
    }

    /// Whether retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}

/// User-facing rendering of an error with optional details and a suggestion.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Rendered error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] suitable for CLI display.
///
/// Walks the `anyhow` chain looking for an [`UnhacsError`]; the outermost
/// `anyhow` message is kept as details when it adds information.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(unhacs_error) = cause.downcast_ref::<UnhacsError>() {
            let ctx = create_error_context(unhacs_error);
            let outer = error.to_string();
            if outer != ctx.message && ctx.details.is_none() {
                return ctx.with_details(outer);
            }
            return ctx;
        }
    }

    let mut ctx = ErrorContext::new(error.to_string());
    let causes: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !causes.is_empty() {
        ctx = ctx.with_details(causes.join(": "));
    }
    ctx
}

fn create_error_context(error: &UnhacsError) -> ErrorContext {
    let ctx = ErrorContext::new(error.to_string());
    match error {
        UnhacsError::ManifestNotFound { .. } => {
            ctx.with_suggestion("Track a package first with 'unhacs add <owner/repo>'")
        }
        UnhacsError::ManifestCorrupt { .. } => ctx
            .with_suggestion("Check the TOML syntax and that every [[packages]] entry has name, repo and category")
            .with_details("Each package needs a unique name and a category such as 'integration' or 'plugin'"),
        UnhacsError::DuplicatePackage { name } => ctx.with_suggestion(format!(
            "Use --name to track '{name}' under a different name, or remove the existing entry first"
        )),
        UnhacsError::PackageNotFound { closest, .. } => match closest {
            Some(candidate) => ctx.with_suggestion(format!("Did you mean '{candidate}'?")),
            None => ctx.with_suggestion("Run 'unhacs list' to see tracked packages"),
        },
        UnhacsError::InvalidPackageName { .. } => ctx.with_suggestion(
            "Package names become directory names: use letters, digits, '-', '_' or '.'",
        ),
        UnhacsError::InvalidRepo { .. } => {
            ctx.with_suggestion("Use the form owner/repo, e.g. 'thomasloven/lovelace-card-mod'")
        }
        UnhacsError::InvalidCategory { .. } => ctx.with_suggestion(
            "Valid categories: integration, plugin, theme, appdaemon-app, netdaemon-app, python-script",
        ),
        UnhacsError::InvalidSourceConfig { .. } => ctx.with_suggestion(
            "Check api_url and github_token in the global configuration (~/.unhacs/config.toml)",
        ),
        UnhacsError::SourceUnavailable { .. } => ctx
            .with_suggestion("Check your network connection, or set github_token to raise the API rate limit")
            .with_details("The request failed or timed out; it is safe to run the command again"),
        UnhacsError::RepoNotFound { .. } => {
            ctx.with_suggestion("Check the repository name; private repositories need a github_token")
        }
        UnhacsError::PinnedVersionNotFound { .. } | UnhacsError::VersionNotFound { .. } => {
            ctx.with_suggestion("Run 'unhacs outdated' to see the versions the repository publishes")
        }
        UnhacsError::NoReleasesAvailable => {
            ctx.with_details("The repository exists but publishes no (non-ignored) releases")
        }
        UnhacsError::ExtractionFailed { .. } | UnhacsError::EmptyArtifact { .. } => {
            ctx.with_details("The previously installed version, if any, was left untouched")
        }
        UnhacsError::FilesystemError { .. } => ctx
            .with_suggestion("Check permissions and free space in the Home Assistant config directory")
            .with_details("The previously installed version, if any, was left untouched"),
    }
}
