//! Command-line interface for unhacs.
//!
//! Each command lives in its own module with its own `clap` argument struct
//! and an `execute` method taking the shared [`common::CommandContext`].
//!
//! # Available Commands
//!
//! - `add` - Track a repository and install it
//! - `remove` - Stop tracking a package and delete its files
//! - `list` - Show tracked packages and whether they are on disk
//! - `sync` - Bring every package to its target version
//! - `outdated` - Show packages a sync would change
//!
//! # Basic Workflow
//!
//! ```bash
//! # Track and install a frontend card
//! unhacs --config-dir /config add thomasloven/lovelace-card-mod --category plugin
//!
//! # Pin an integration to a release
//! unhacs add nielsfaber/alarmo --version v1.10.4
//!
//! # Later: see what changed upstream, then apply it
//! unhacs outdated
//! unhacs sync
//! ```
//!
//! # Global Options
//!
//! - `--verbose` / `--quiet` - Log level (`RUST_LOG` overrides both)
//! - `--config` - Global configuration file (default `~/.unhacs/config.toml`)
//! - `--config-dir` - Home Assistant configuration directory (default `.`)
//! - `--manifest` - Manifest file (default `<config-dir>/unhacs.toml`)
//! - `--no-progress` - Disable progress bars

mod add;
pub mod common;
mod list;
mod outdated;
mod remove;
mod sync;


use crate::config::GlobalConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use common::CommandContext;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings derived from the global flags before any command runs.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Disable progress bars
    pub no_progress: bool,

    /// Global configuration file override
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over the level chosen by the flags.
    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("unhacs_cli={}", self.log_level)));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Manage Home Assistant add-ons from GitHub releases without HACS.
#[derive(Parser)]
#[command(
    name = "unhacs",
    about = "Install and update Home Assistant add-ons from GitHub releases",
    version,
    long_about = "unhacs keeps custom integrations, frontend plugins, themes and scripts in a \
                  Home Assistant configuration directory in sync with a manifest (unhacs.toml)."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Global configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Home Assistant configuration directory
    #[arg(long, global = true, value_name = "DIR", default_value = ".", env = "UNHACS_CONFIG_DIR")]
    config_dir: PathBuf,

    /// Manifest file (defaults to unhacs.toml in the configuration directory)
    #[arg(long, global = true, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Disable progress bars
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Track a repository and install it
    Add(add::AddCommand),

    /// Stop tracking a package
    Remove(remove::RemoveCommand),

    /// List tracked packages
    List(list::ListCommand),

    /// Install or update packages to their target versions
    Sync(sync::SyncCommand),

    /// Show packages with a different target version
    Outdated(outdated::OutdatedCommand),
}

impl Cli {
    /// Run the parsed command.
    ///
    /// # Errors
    ///
    /// Returns the command's error; `main` renders it with
    /// [`crate::core::user_friendly_error`].
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Derive logging and progress settings from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            no_progress: self.no_progress || self.quiet,
            config_path: self.config.clone(),
        }
    }

    /// Run the command with an explicit [`CliConfig`].
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        let global = GlobalConfig::load_with_optional(config.config_path.clone()).await?;
        let ctx = CommandContext::new(self.config_dir, self.manifest, global)
            .with_quiet(self.quiet)
            .with_progress(!config.no_progress);

        match self.command {
            Commands::Add(cmd) => cmd.execute(&ctx).await,
            Commands::Remove(cmd) => cmd.execute(&ctx),
            Commands::List(cmd) => cmd.execute(&ctx),
            Commands::Sync(cmd) => cmd.execute(&ctx).await,
            Commands::Outdated(cmd) => cmd.execute(&ctx).await,
        }
    }
}
