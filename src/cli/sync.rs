//! Bring packages to their target versions.
//!
//! Every package gets a status line, even when some fail. The command fails
//! (exit status 1) if at least one package did.

use super::common::{CommandContext, finish_reports, render_report};
use crate::utils::ProgressBar;
use anyhow::Result;
use clap::Args;

/// Arguments of `unhacs sync`.
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Only sync these packages (all when omitted)
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,
}

impl SyncCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let mut manifest = ctx.load_manifest()?;
        if manifest.is_empty() {
            ctx.say("No packages tracked. Add one with 'unhacs add <owner/repo>'.");
            return Ok(());
        }

        let engine = ctx.sync_engine()?;
        let total = if self.names.is_empty() { manifest.len() } else { self.names.len() };
        let bar = ProgressBar::new(total as u64, ctx.progress);
        bar.set_message("Syncing packages");

        let on_report = |report: &crate::sync::PackageReport| {
            bar.inc(1);
            bar.set_message(report.name.clone());
            if !ctx.quiet {
                bar.println(&render_report(report));
            }
        };

        let result = if self.names.is_empty() {
            engine.sync_with_progress(&mut manifest, on_report).await
        } else {
            engine.sync_selected(&mut manifest, &self.names, on_report).await
        };
        bar.finish_and_clear();

        finish_reports(&result?)
    }
}
