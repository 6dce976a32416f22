//! unhacs - manifest-driven add-on manager for Home Assistant
//!
//! unhacs tracks custom integrations, frontend plugins, themes and scripts
//! published as GitHub releases, and keeps a Home Assistant configuration
//! directory in sync with a manifest, without running HACS inside Home
//! Assistant.
//!
//! # Architecture Overview
//!
//! - `unhacs.toml` lists the tracked packages, their version constraints and
//!   the version last installed
//! - releases are discovered and downloaded through a [`source::SourceClient`]
//! - the [`resolver`] picks the target release of each package
//! - the [`installer`] stages the artifact and swaps it into place
//! - the [`sync`] engine drives all of the above, package by package
//!
//! # Core Modules
//!
//! - [`core`] - Error types and package categories
//! - [`manifest`] - Manifest model, loading and atomic saving
//! - [`source`] - Repository identifiers, releases and the GitHub client
//! - [`resolver`] - Version resolution
//! - [`installer`] - Artifact classification, extraction and installation
//! - [`sync`] - Synchronisation engine, update checks and status listing
//!
//! ## Supporting Modules
//! - [`cli`] - Command-line interface
//! - [`config`] - Global configuration (`~/.unhacs/config.toml`)
//! - [`constants`] - Defaults and well-known names
//! - [`utils`] - Filesystem helpers and progress bars
//!
//! # Manifest Format (unhacs.toml)
//!
//! ```toml
//! [[packages]]
//! name = "alarmo"
//! repo = "nielsfaber/alarmo"
//! category = "integration"
//! constraint = "v1.10.4"
//! installed_version = "v1.10.4"
//!
//! [[packages]]
//! name = "card-mod"
//! repo = "thomasloven/lovelace-card-mod"
//! category = "plugin"
//! ```
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use unhacs_cli::config::GlobalConfig;
//! use unhacs_cli::manifest::Manifest;
//! use unhacs_cli::source::GitHubClient;
//! use unhacs_cli::sync::{SyncEngine, SyncOptions};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GlobalConfig::default();
//! let options = SyncOptions::new("/config");
//! let mut manifest = Manifest::load_or_default(&options.manifest_path)?;
//!
//! let engine = SyncEngine::new(Arc::new(GitHubClient::from_config(&config)?), options);
//! for report in engine.sync(&mut manifest).await? {
//!     println!("{}: {:?}", report.name, report.outcome);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod installer;
pub mod manifest;
pub mod resolver;
pub mod source;
pub mod sync;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
