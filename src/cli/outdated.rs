//! Show which packages a sync would change.
//!
//! Nothing is downloaded or installed. With `--check` the command exits with
//! status 1 when any update is available, for use in automations.

use super::common::CommandContext;
use crate::sync::{UpdateReport, UpdateStatus};
use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;

/// Arguments of `unhacs outdated`.
#[derive(Debug, Args)]
pub struct OutdatedCommand {
    /// Exit with a non-zero status if updates are available
    #[arg(long)]
    pub check: bool,
}

impl OutdatedCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let manifest = ctx.load_manifest()?;
        if manifest.is_empty() {
            ctx.say("No packages tracked.");
            return Ok(());
        }

        let reports = ctx.sync_engine()?.check(&manifest).await;
        let mut available = 0;
        for report in &reports {
            if matches!(report.status, UpdateStatus::Available { .. }) {
                available += 1;
            }
            println!("{}", render_update(report));
        }

        if available == 0 {
            ctx.say("All packages are up to date".green());
        } else if self.check {
            bail!("{available} package(s) have updates available");
        }
        Ok(())
    }
}

fn render_update(report: &UpdateReport) -> String {
    match &report.status {
        UpdateStatus::UpToDate {
            version,
        } => format!("{:<24} {}", report.name, version.dimmed()),
        UpdateStatus::Available {
            current,
            latest,
        } => format!(
            "{:<24} {} → {}",
            report.name.bold(),
            current.as_deref().unwrap_or("not installed").yellow(),
            latest.green()
        ),
        UpdateStatus::Failed(e) => format!("{:<24} {}", report.name, e.to_string().red()),
    }
}
