//! Common context and rendering shared by CLI commands.

use crate::config::GlobalConfig;
use crate::constants::DEFAULT_MANIFEST_FILE;
use crate::manifest::Manifest;
use crate::source::GitHubClient;
use crate::sync::{PackageReport, SyncEngine, SyncOptions, SyncOutcome};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a command needs besides its own arguments.
#[derive(Debug)]
pub struct CommandContext {
    /// Home Assistant configuration directory
    pub config_dir: PathBuf,
    /// Path to the manifest file
    pub manifest_path: PathBuf,
    /// User-wide settings
    pub global: GlobalConfig,
    /// Suppress informational output
    pub quiet: bool,
    /// Draw progress bars
    pub progress: bool,
}

impl CommandContext {
    /// Context for `config_dir`, with the manifest at `manifest_path` or
    /// `config_dir/unhacs.toml`.
    pub fn new(config_dir: PathBuf, manifest_path: Option<PathBuf>, global: GlobalConfig) -> Self {
        let manifest_path = manifest_path.unwrap_or_else(|| config_dir.join(DEFAULT_MANIFEST_FILE));
        Self {
            config_dir,
            manifest_path,
            global,
            quiet: false,
            progress: true,
        }
    }

    /// Suppress informational output.
    #[must_use]
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Enable or disable progress bars.
    #[must_use]
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Load the manifest; a missing file is an empty manifest.
    ///
    /// # Errors
    /// Returns an error if the manifest exists but cannot be read or parsed
    pub fn load_manifest(&self) -> Result<Manifest> {
        Manifest::load_or_default(&self.manifest_path)
            .with_context(|| format!("Failed to load manifest {}", self.manifest_path.display()))
    }

    /// Save the manifest atomically.
    ///
    /// # Errors
    /// Returns an error if the manifest cannot be written
    pub fn save_manifest(&self, manifest: &Manifest) -> Result<()> {
        manifest
            .save(&self.manifest_path)
            .with_context(|| format!("Failed to save manifest {}", self.manifest_path.display()))
    }

    /// A sync engine talking to GitHub with the user's settings.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn sync_engine(&self) -> Result<SyncEngine> {
        let client = GitHubClient::from_config(&self.global)?;
        let options =
            SyncOptions::from_config(self.config_dir.clone(), self.manifest_path.clone(), &self.global);
        Ok(SyncEngine::new(Arc::new(client), options))
    }

    /// Print `line` unless quiet.
    pub fn say(&self, line: impl std::fmt::Display) {
        if !self.quiet {
            println!("{line}");
        }
    }
}

/// One status line for a sync report.
pub fn render_report(report: &PackageReport) -> String {
    match &report.outcome {
        SyncOutcome::NoChange {
            version,
        } => format!("{} {} {}", "✓".green(), report.name, version.dimmed()),
        SyncOutcome::Installed {
            new, ..
        } => format!("{} {} {}", "+".green().bold(), report.name, new.green()),
        SyncOutcome::Updated {
            old,
            new,
        } => format!(
            "{} {} {} → {}",
            "↑".cyan().bold(),
            report.name,
            old.as_deref().unwrap_or("unknown").dimmed(),
            new.cyan()
        ),
        SyncOutcome::Failed(e) => format!("{} {} {}", "✗".red().bold(), report.name, e.to_string().red()),
    }
}

/// Turn a batch of reports into the command's result.
///
/// # Errors
/// Returns an error naming the failed packages if any report is a failure
pub fn finish_reports(reports: &[PackageReport]) -> Result<()> {
    let failed: Vec<&str> =
        reports.iter().filter(|r| r.outcome.is_failure()).map(|r| r.name.as_str()).collect();
    if failed.is_empty() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("{} package(s) failed to sync: {}", failed.len(), failed.join(", ")))
    }
}
