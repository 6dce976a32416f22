//! Show tracked packages.

use super::common::CommandContext;
use crate::sync::{PackageStatus, list};
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

/// Arguments of `unhacs list`.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ListCommand {
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let manifest = ctx.load_manifest()?;
        let statuses = list(&manifest, &ctx.config_dir);

        if self.json {
            let json = serde_json::to_string_pretty(&statuses).context("Failed to serialize package list")?;
            println!("{json}");
            return Ok(());
        }

        if statuses.is_empty() {
            ctx.say("No packages tracked. Add one with 'unhacs add <owner/repo>'.");
            return Ok(());
        }

        for status in &statuses {
            println!("{}", render_status(status));
        }
        Ok(())
    }
}

fn render_status(status: &PackageStatus) -> String {
    let installed = match (&status.installed_version, status.present) {
        (Some(version), true) => version.green().to_string(),
        (Some(version), false) => format!("{} {}", version.yellow(), "(missing)".yellow()),
        (None, _) => "not installed".dimmed().to_string(),
    };
    let constraint =
        if status.constraint.is_latest() { String::new() } else { format!(" pinned {}", status.constraint) };

    format!(
        "{:<24} {:<14} {:<40} {}{}",
        status.name.bold(),
        status.category.as_str(),
        status.repo.to_string(),
        installed,
        constraint.cyan()
    )
}
