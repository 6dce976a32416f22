//! In-memory source client for tests.

use crate::core::{Result, UnhacsError};
use crate::source::{Artifact, Release, RepoId, SourceClient};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A [`SourceClient`] serving canned releases.
///
/// - a repository never registered answers [`UnhacsError::RepoNotFound`]
/// - a tag without an artifact answers [`UnhacsError::VersionNotFound`]
/// - [`FakeSourceClient::fail_list`] makes the next `n` listings of a repo fail
///   with [`UnhacsError::SourceUnavailable`]
///
/// Every call is counted so tests can assert that work was skipped.
#[derive(Debug, Default)]
pub struct FakeSourceClient {
    releases: HashMap<RepoId, Vec<Release>>,
    artifacts: HashMap<(RepoId, String), Artifact>,
    latency: Option<Duration>,
    list_failures: Mutex<HashMap<RepoId, usize>>,
    list_calls: Mutex<Vec<RepoId>>,
    fetch_calls: Mutex<Vec<(RepoId, String)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

fn repo_id(repo: &str) -> RepoId {
    repo.parse().unwrap_or_else(|e| panic!("bad repo in test: {e}"))
}

impl FakeSourceClient {
    /// An empty source that knows no repositories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing repository that has no releases yet.
    #[must_use]
    pub fn with_repo(mut self, repo: &str) -> Self {
        self.releases.entry(repo_id(repo)).or_default();
        self
    }

    /// Append `release` to `repo`'s listing and serve `artifact` for its tag.
    ///
    /// Releases are listed in insertion order.
    #[must_use]
    pub fn with_release(mut self, repo: &str, release: Release, artifact: Artifact) -> Self {
        let id = repo_id(repo);
        self.artifacts.insert((id.clone(), release.tag.clone()), artifact);
        self.releases.entry(id).or_default().push(release);
        self
    }

    /// List `release` without serving an artifact for it.
    #[must_use]
    pub fn with_listed_only(mut self, repo: &str, release: Release) -> Self {
        self.releases.entry(repo_id(repo)).or_default().push(release);
        self
    }

    /// Delay every call by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next `times` listings of `repo` fail as unavailable.
    pub fn fail_list(&self, repo: &str, times: usize) {
        self.list_failures.lock().unwrap_or_else(|e| e.into_inner()).insert(repo_id(repo), times);
    }

    /// Number of `list_versions` calls so far.
    pub fn list_calls(&self) -> usize {
        self.list_calls.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Every `fetch` call so far, as `(owner/repo, tag)`.
    pub fn fetch_calls(&self) -> Vec<(String, String)> {
        self.fetch_calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(repo, tag)| (repo.to_string(), tag.clone()))
            .collect()
    }

    /// Highest number of calls that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl SourceClient for FakeSourceClient {
    async fn list_versions(&self, repo: &RepoId) -> Result<Vec<Release>> {
        self.list_calls.lock().unwrap_or_else(|e| e.into_inner()).push(repo.clone());
        self.enter().await;
        self.leave();

        {
            let mut failures = self.list_failures.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(remaining) = failures.get_mut(repo)
                && *remaining > 0
            {
                *remaining -= 1;
                return Err(UnhacsError::SourceUnavailable {
                    repo: repo.to_string(),
                    reason: "simulated outage".to_string(),
                });
            }
        }

        self.releases.get(repo).cloned().ok_or_else(|| UnhacsError::RepoNotFound {
            repo: repo.to_string(),
        })
    }

    async fn fetch(&self, repo: &RepoId, version: &str) -> Result<Artifact> {
        self.fetch_calls.lock().unwrap_or_else(|e| e.into_inner()).push((repo.clone(), version.to_string()));
        self.enter().await;
        self.leave();

        self.artifacts.get(&(repo.clone(), version.to_string())).cloned().ok_or_else(|| {
            UnhacsError::VersionNotFound {
                repo: repo.to_string(),
                version: version.to_string(),
            }
        })
    }
}
