//! Synchronisation of installed packages with the manifest.
//!
//! The [`SyncEngine`] is the only component that combines the others: for each
//! manifest entry it asks the [`SourceClient`] for releases, lets the resolver
//! pick a target, fetches the artifact, and hands it to the installer.
//!
//! # Pipeline
//!
//! Per package, independently of every other package:
//!
//! 1. **List**: fetch the release list, unless a pinned constraint already
//!    matches the recorded version
//! 2. **Resolve**: pick the target tag (see [`crate::resolver`])
//! 3. **Compare**: a target equal to the recorded version is [`SyncOutcome::NoChange`]
//! 4. **Fetch and install**: download the artifact and install it on a
//!    blocking thread
//!
//! Any error in these steps becomes [`SyncOutcome::Failed`] for that package
//! alone; the rest of the batch carries on.
//!
//! # Concurrency
//!
//! Up to [`SyncOptions::max_parallel`] pipelines run at once. Results are
//! collected in manifest order, and the manifest is updated and saved once, by
//! the calling task, after every pipeline has finished. Package names are
//! unique, so no two pipelines ever target the same destination.
//!
//! # Retries
//!
//! Source calls failing with a retryable error ([`UnhacsError::is_retryable`])
//! are retried with exponential backoff, up to [`SyncOptions::retry_attempts`]
//! attempts in total. Not-found errors fail immediately.

mod status;


pub use status::{PackageStatus, list};

use crate::config::GlobalConfig;
use crate::constants::{DEFAULT_MANIFEST_FILE, MAX_BACKOFF_DELAY_MS, STARTING_BACKOFF_DELAY_MS};
use crate::core::{Result, UnhacsError};
use crate::installer;
use crate::manifest::{Manifest, Package};
use crate::resolver::resolve_package;
use crate::source::SourceClient;
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, error, info, warn};

/// Per-run configuration of the [`SyncEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Home Assistant configuration directory packages install under
    pub target_root: PathBuf,
    /// Where the manifest is saved after a run that changed something
    pub manifest_path: PathBuf,
    /// Maximum number of packages processed concurrently (at least 1)
    pub max_parallel: usize,
    /// Attempts for a retryable source call, first try included (at least 1)
    pub retry_attempts: usize,
    /// Delay before the first retry; later retries double it
    pub retry_base_delay: Duration,
}

impl SyncOptions {
    /// Defaults for `target_root`, with the manifest at `target_root/unhacs.toml`.
    pub fn new(target_root: impl Into<PathBuf>) -> Self {
        let target_root = target_root.into();
        let config = GlobalConfig::default();
        Self {
            manifest_path: target_root.join(DEFAULT_MANIFEST_FILE),
            target_root,
            max_parallel: config.max_parallel,
            retry_attempts: config.retry_attempts,
            retry_base_delay: Duration::from_millis(STARTING_BACKOFF_DELAY_MS),
        }
    }

    /// Options for `target_root` and `manifest_path`, tuned by `config`.
    pub fn from_config(target_root: PathBuf, manifest_path: PathBuf, config: &GlobalConfig) -> Self {
        Self {
            manifest_path,
            max_parallel: config.max_parallel.max(1),
            retry_attempts: config.retry_attempts.max(1),
            ..Self::new(target_root)
        }
    }

    /// Save the manifest to `path` instead.
    #[must_use]
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }
}

/// Result of synchronising one package.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The recorded version already matches the target
    NoChange {
        /// The recorded (and target) version
        version: String,
    },
    /// The package had no files on disk and now does
    Installed {
        /// Version recorded before the run, if any
        old: Option<String>,
        /// Version now installed
        new: String,
    },
    /// Existing files were replaced by another version
    Updated {
        /// Version recorded before the run, if any
        old: Option<String>,
        /// Version now installed
        new: String,
    },
    /// The pipeline stopped with an error; nothing was changed for this package
    Failed(UnhacsError),
}

impl SyncOutcome {
    /// Whether this package failed.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The version newly installed by this run, if any.
    #[must_use]
    pub fn installed_version(&self) -> Option<&str> {
        match self {
            Self::Installed { new, .. } | Self::Updated { new, .. } => Some(new),
            Self::NoChange { .. } | Self::Failed(_) => None,
        }
    }
}

/// Outcome of one package, tagged with its name.
#[derive(Debug)]
pub struct PackageReport {
    /// Package name
    pub name: String,
    /// What happened
    pub outcome: SyncOutcome,
}

/// Result of checking one package for updates.
#[derive(Debug)]
pub enum UpdateStatus {
    /// The recorded version is the target
    UpToDate {
        /// The recorded version
        version: String,
    },
    /// A sync would install `latest`
    Available {
        /// Version recorded now, if any
        current: Option<String>,
        /// Version a sync would install
        latest: String,
    },
    /// The check failed
    Failed(UnhacsError),
}

/// Update status of one package, tagged with its name.
#[derive(Debug)]
pub struct UpdateReport {
    /// Package name
    pub name: String,
    /// What a sync would do
    pub status: UpdateStatus,
}

/// Drives the list → resolve → fetch → install pipeline for a manifest.
pub struct SyncEngine {
    client: Arc<dyn SourceClient>,
    options: SyncOptions,
}

impl SyncEngine {
    /// Create an engine fetching from `client`.
    pub fn new(client: Arc<dyn SourceClient>, options: SyncOptions) -> Self {
        Self {
            client,
            options,
        }
    }

    /// The options this engine runs with.
    #[must_use]
    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Bring every package of `manifest` to its target version.
    ///
    /// Returns one report per package, in manifest order. Recorded versions of
    /// installed packages are updated in `manifest`, which is saved to
    /// [`SyncOptions::manifest_path`] once if anything changed.
    ///
    /// # Errors
    ///
    /// Per-package failures are reported, not returned. The only error is a
    /// failure to save the manifest.
    pub async fn sync(&self, manifest: &mut Manifest) -> Result<Vec<PackageReport>> {
        self.sync_with_progress(manifest, |_| {}).await
    }

    /// Like [`SyncEngine::sync`], calling `on_report` for each report as it
    /// becomes available, in manifest order.
    pub async fn sync_with_progress<F>(&self, manifest: &mut Manifest, on_report: F) -> Result<Vec<PackageReport>>
    where
        F: FnMut(&PackageReport),
    {
        let packages = manifest.packages().to_vec();
        self.run(manifest, packages, on_report).await
    }

    /// Synchronise only the packages named in `names`, in manifest order.
    ///
    /// # Errors
    ///
    /// Returns [`UnhacsError::PackageNotFound`] before doing any work if a name
    /// is not tracked, and otherwise fails only if the manifest cannot be saved.
    pub async fn sync_selected<F>(
        &self,
        manifest: &mut Manifest,
        names: &[String],
        on_report: F,
    ) -> Result<Vec<PackageReport>>
    where
        F: FnMut(&PackageReport),
    {
        for name in names {
            manifest.require(name)?;
        }
        let packages: Vec<Package> =
            manifest.packages().iter().filter(|p| names.contains(&p.name)).cloned().collect();
        self.run(manifest, packages, on_report).await
    }

    async fn run<F>(&self, manifest: &mut Manifest, packages: Vec<Package>, mut on_report: F) -> Result<Vec<PackageReport>>
    where
        F: FnMut(&PackageReport),
    {
        debug!("Synchronising {} package(s), {} at a time", packages.len(), self.options.max_parallel);
        let total = packages.len();

        let mut results = stream::iter(packages)
            .map(|package| async move {
                let outcome = self.sync_package(&package).await;
                PackageReport {
                    name: package.name,
                    outcome,
                }
            })
            .buffered(self.options.max_parallel.max(1));

        let mut reports = Vec::with_capacity(total);
        while let Some(report) = results.next().await {
            on_report(&report);
            reports.push(report);
        }

        let mut changed = false;
        for report in &reports {
            if let Some(version) = report.outcome.installed_version() {
                manifest.record_installed(&report.name, version)?;
                changed = true;
            }
        }
        if changed && let Err(e) = manifest.save(&self.options.manifest_path) {
            for report in &reports {
                if let Some(version) = report.outcome.installed_version() {
                    error!(
                        "{} {} is installed but not recorded in {}",
                        report.name,
                        version,
                        self.options.manifest_path.display()
                    );
                }
            }
            return Err(e);
        }

        Ok(reports)
    }

    /// Report which packages a sync would change, without fetching or installing.
    pub async fn check(&self, manifest: &Manifest) -> Vec<UpdateReport> {
        stream::iter(manifest.packages())
            .map(|package| async move {
                let status = match self.target_version(package).await {
                    Ok(target) if package.installed_version.as_deref() == Some(target.as_str()) => {
                        UpdateStatus::UpToDate {
                            version: target,
                        }
                    }
                    Ok(target) => UpdateStatus::Available {
                        current: package.installed_version.clone(),
                        latest: target,
                    },
                    Err(e) => UpdateStatus::Failed(e),
                };
                UpdateReport {
                    name: package.name.clone(),
                    status,
                }
            })
            .buffered(self.options.max_parallel.max(1))
            .collect::<Vec<_>>()
            .await
    }

    async fn sync_package(&self, package: &Package) -> SyncOutcome {
        match self.try_sync_package(package).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Failed to sync {}: {}", package.name, e);
                SyncOutcome::Failed(e)
            }
        }
    }

    async fn try_sync_package(&self, package: &Package) -> Result<SyncOutcome> {
        let target = self.target_version(package).await?;
        let old = package.installed_version.clone();

        if old.as_deref() == Some(target.as_str()) {
            debug!("{} is at {}", package.name, target);
            if !installer::is_installed(package, &self.options.target_root) {
                warn!(
                    "{} is recorded at {} but {} is missing; clear installed_version to reinstall",
                    package.name,
                    target,
                    package.destination(&self.options.target_root).display()
                );
            }
            return Ok(SyncOutcome::NoChange {
                version: target,
            });
        }

        let artifact = self.with_retry(|| self.client.fetch(&package.repo, &target)).await?;
        debug!("Fetched {} ({} bytes) for {}", artifact.filename, artifact.bytes.len(), package.name);

        let destination = package.destination(&self.options.target_root);
        let installed = {
            let package = package.clone();
            let target_root = self.options.target_root.clone();
            tokio::task::spawn_blocking(move || installer::install(&package, &artifact, &target_root))
                .await
                .map_err(|e| UnhacsError::fs("installing into", &destination, std::io::Error::other(e)))??
        };

        info!("{} {} → {}", package.name, old.as_deref().unwrap_or("(none)"), target);
        Ok(if installed.replaced {
            SyncOutcome::Updated {
                old,
                new: target,
            }
        } else {
            SyncOutcome::Installed {
                old,
                new: target,
            }
        })
    }

    /// The tag `package` should be at.
    ///
    /// A pinned constraint equal to the recorded version is returned without
    /// listing releases.
    async fn target_version(&self, package: &Package) -> Result<String> {
        if let Some(pinned) = package.constraint.pinned()
            && package.installed_version.as_deref() == Some(pinned)
        {
            return Ok(pinned.to_string());
        }

        let releases = self.with_retry(|| self.client.list_versions(&package.repo)).await?;
        let release = resolve_package(package, &releases)?;
        Ok(release.tag.clone())
    }

    async fn with_retry<T, A, Fut>(&self, action: A) -> Result<T>
    where
        A: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        // First delay is 2 * factor; each later one doubles.
        let base_ms = u64::try_from(self.options.retry_base_delay.as_millis()).unwrap_or(u64::MAX);
        let strategy = ExponentialBackoff::from_millis(2)
            .factor((base_ms / 2).max(1))
            .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS))
            .take(self.options.retry_attempts.saturating_sub(1));

        RetryIf::spawn(strategy, action, |e: &UnhacsError| {
            let retry = e.is_retryable();
            if retry {
                warn!("Retrying after: {}", e);
            }
            retry
        })
        .await
    }
}
