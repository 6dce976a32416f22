//! Global user configuration for unhacs.
//!
//! The global configuration file (`~/.unhacs/config.toml`) holds user-wide
//! settings: the GitHub token used to lift API rate limits, the API endpoint,
//! and tuning knobs for synchronisation. It is never part of the Home
//! Assistant configuration directory, so tokens stay out of backups and
//! version control.
//!
//! # File Location
//!
//! - **Unix/macOS**: `~/.unhacs/config.toml`
//! - **Windows**: `%LOCALAPPDATA%\unhacs\config.toml`
//!
//! Pass `--config <path>` on the command line to use another file.
//!
//! # File Format
//!
//! ```toml
//! github_token = "ghp_xxxxxxxxxxxx"
//! api_url = "https://api.github.com"
//! timeout_secs = 30
//! max_parallel = 4
//! retry_attempts = 3
//! ```
//!
//! Every key is optional. When `github_token` is absent the `GITHUB_TOKEN`
//! environment variable is used instead.

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_MAX_PARALLEL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_ATTEMPTS,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// Global configuration for unhacs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Personal access token sent as a bearer token.
    ///
    /// Unauthenticated clients get 60 requests per hour; a token raises that
    /// to 5000 and grants access to private repositories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    /// Base URL of the GitHub REST API.
    pub api_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum number of packages synchronised concurrently.
    pub max_parallel: usize,

    /// Attempts for a call that failed with a transient error, first try included.
    pub retry_attempts: usize,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            max_parallel: DEFAULT_MAX_PARALLEL,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        }
    }
}

impl GlobalConfig {
    /// Load from `path` if given, otherwise from [`GlobalConfig::default_path`].
    ///
    /// A missing file yields the defaults. The `GITHUB_TOKEN` environment
    /// variable fills in `github_token` when the file leaves it unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => Some(path),
            None => Self::default_path().ok(),
        };

        let mut config = match path {
            Some(path) if path.exists() => Self::load_from(&path).await?,
            _ => Self::default(),
        };

        if config.github_token.is_none() {
            config.github_token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.trim().is_empty());
        }
        Ok(config)
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading global config from {}", path.display());
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// Platform-appropriate location of the global configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("unhacs")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".unhacs")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
