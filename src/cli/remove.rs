//! Stop tracking a package.
//!
//! Installed files are deleted first; the manifest entry is dropped only once
//! that succeeded, so a failed removal can simply be retried.

use super::common::CommandContext;
use crate::installer;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

/// Arguments of `unhacs remove`.
#[derive(Debug, Args)]
pub struct RemoveCommand {
    /// Name of the tracked package
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Keep the installed files; only drop the manifest entry
    #[arg(long)]
    pub keep_files: bool,
}

impl RemoveCommand {
    pub fn execute(self, ctx: &CommandContext) -> Result<()> {
        let mut manifest = ctx.load_manifest()?;
        let package = manifest.require(&self.name)?.clone();

        let deleted = if self.keep_files {
            false
        } else {
            installer::uninstall(&package, &ctx.config_dir)
                .with_context(|| format!("Failed to delete the files of '{}'", package.name))?
        };

        manifest.remove_package(&package.name)?;
        ctx.save_manifest(&manifest)?;

        if deleted {
            ctx.say(format!(
                "{} {} and deleted {}",
                "Removed".green(),
                package.name,
                package.destination(&ctx.config_dir).display()
            ));
        } else {
            ctx.say(format!("{} {}", "Removed".green(), package.name));
        }
        Ok(())
    }
}
