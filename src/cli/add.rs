//! Track a new package.
//!
//! ```bash
//! unhacs add nielsfaber/alarmo
//! unhacs add https://github.com/thomasloven/lovelace-card-mod --category plugin --name card-mod
//! unhacs add someone/theme --category theme --version v2.1.0 --no-sync
//! ```
//!
//! The manifest is saved before anything is downloaded, so a failed install
//! leaves the package tracked and a later `unhacs sync` picks it up.

use super::common::{CommandContext, finish_reports, render_report};
use crate::core::PackageCategory;
use crate::manifest::Package;
use crate::source::RepoId;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

/// Arguments of `unhacs add`.
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Repository, as owner/repo or a GitHub URL
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// Package name (defaults to the repository name)
    #[arg(long)]
    pub name: Option<String>,

    /// Package category
    #[arg(short = 't', long, value_name = "CATEGORY", default_value = "integration")]
    pub category: PackageCategory,

    /// Pin to this release tag instead of following the latest release
    #[arg(long, value_name = "TAG")]
    pub version: Option<String>,

    /// Release tag to skip when following the latest release (repeatable)
    #[arg(long = "ignore", value_name = "TAG")]
    pub ignored_versions: Vec<String>,

    /// Only update the manifest; do not download anything
    #[arg(long)]
    pub no_sync: bool,
}

impl AddCommand {
    /// Build the manifest entry described by the arguments.
    ///
    /// # Errors
    /// Returns an error if the repository identifier is malformed
    pub fn package(&self) -> Result<Package> {
        let repo: RepoId = self.repo.parse()?;
        let mut package = Package::new(repo, self.category);
        if let Some(name) = &self.name {
            package = package.with_name(name.clone());
        }
        if let Some(version) = &self.version {
            package = package.with_constraint(version.as_str());
        }
        package.ignored_versions.clone_from(&self.ignored_versions);
        Ok(package)
    }

    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let package = self.package()?;
        let name = package.name.clone();
        let summary = format!("{} {} ({}, {})", "Added".green(), name, package.repo, package.category);

        let mut manifest = ctx.load_manifest()?;
        manifest.add_package(package).with_context(|| format!("Failed to add '{}'", self.repo))?;
        ctx.save_manifest(&manifest)?;
        ctx.say(summary);

        if self.no_sync {
            return Ok(());
        }

        let engine = ctx.sync_engine()?;
        let reports = engine.sync_selected(&mut manifest, &[name], |_| {}).await?;
        for report in &reports {
            ctx.say(render_report(report));
        }
        finish_reports(&reports)
    }
}
