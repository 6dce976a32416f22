//! GitHub implementation of [`SourceClient`].
//!
//! Uses the REST API:
//! - `GET /repos/{owner}/{repo}/releases` to list releases, following the
//!   `Link: <..>; rel="next"` header across pages
//! - `GET /repos/{owner}/{repo}/releases/tags/{tag}` to re-check a tag at fetch time
//! - `GET /repos/{owner}/{repo}/contents/hacs.json?ref={tag}` for the optional
//!   `hacs.json` that names a release asset
//! - `GET /repos/{owner}/{repo}/contents/dist/{file}.js?ref={tag}` for frontend
//!   plugins that commit their build output
//! - the asset's download URL, or `GET /repos/{owner}/{repo}/zipball/{tag}`
//!
//! # Artifact selection
//!
//! 1. the release asset named by `hacs.json`'s `filename`
//! 2. without a `filename`: a release asset called `<repo>.js` (with any
//!    `lovelace-` prefix dropped, or as-is), then the same name under `dist/`
//! 3. the source zipball, saved as `<repo>-<tag>.zip`

use super::{Artifact, Release, ReleaseAsset, RepoId, SourceClient};
use crate::config::GlobalConfig;
use crate::constants::{GITHUB_API_VERSION, MAX_RELEASE_PAGES, RELEASES_PER_PAGE, USER_AGENT};
use crate::core::{Result, UnhacsError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, LINK};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    assets: Vec<GitHubAsset>,
}

#[derive(Debug, Deserialize)]
struct GitHubAsset {
    name: String,
    browser_download_url: String,
}

/// The subset of `hacs.json` that affects which artifact is downloaded.
#[derive(Debug, Default, Deserialize)]
struct HacsManifest {
    #[serde(default)]
    filename: Option<String>,
}

impl From<GitHubRelease> for Release {
    fn from(release: GitHubRelease) -> Self {
        Self {
            tag: release.tag_name,
            published_at: release.published_at,
            assets: release
                .assets
                .into_iter()
                .map(|asset| ReleaseAsset {
                    name: asset.name,
                    download_url: asset.browser_download_url,
                })
                .collect(),
        }
    }
}

/// Client for the GitHub REST API.
///
/// Every request is bounded by the timeout given at construction; a request
/// that exceeds it fails with [`UnhacsError::SourceUnavailable`].
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: Url,
}

impl GitHubClient {
    /// Create a client against `api_url` (e.g. `https://api.github.com`).
    ///
    /// # Errors
    ///
    /// Returns [`UnhacsError::InvalidSourceConfig`] if the URL or token is
    /// unusable or the HTTP client cannot be built.
    pub fn new(api_url: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let invalid = |reason: String| UnhacsError::InvalidSourceConfig {
            reason,
        };

        let parsed = Url::parse(api_url).map_err(|e| invalid(format!("invalid API URL {api_url}: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid(format!("API URL {api_url} cannot be a base")));
        }
        let api_url = parsed;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(GITHUB_API_VERSION));
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| invalid("github_token contains invalid characters".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| invalid(format!("failed to construct HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_url,
        })
    }

    /// Create a client from the global configuration.
    pub fn from_config(config: &GlobalConfig) -> Result<Self> {
        Self::new(&config.api_url, config.github_token.as_deref(), config.timeout())
    }

    fn endpoint(&self, repo: &RepoId, tail: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| UnhacsError::InvalidSourceConfig {
                reason: format!("API URL {} cannot be a base (requested {repo})", self.api_url),
            })?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.name.as_str()])
            .extend(tail);
        Ok(url)
    }

    async fn get(&self, repo: &RepoId, url: Url, accept: Option<&'static str>) -> Result<reqwest::Response> {
        debug!("GET {}", url);
        let mut request = self.http.get(url);
        if let Some(accept) = accept {
            request = request.header(ACCEPT, accept);
        }
        request.send().await.map_err(|e| transport_error(repo, &e))
    }

    async fn release_by_tag(&self, repo: &RepoId, version: &str) -> Result<Release> {
        let url = self.endpoint(repo, &["releases", "tags", version])?;
        let response = self.get(repo, url, None).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(UnhacsError::VersionNotFound {
                repo: repo.to_string(),
                version: version.to_string(),
            }),
            status if status.is_success() => {
                let release: GitHubRelease =
                    response.json().await.map_err(|e| transport_error(repo, &e))?;
                Ok(release.into())
            }
            status => Err(status_error(repo, status)),
        }
    }

    /// Raw content of `path` in the repository at `version`; `None` if absent.
    async fn raw_file(&self, repo: &RepoId, version: &str, path: &[&str]) -> Result<Option<Vec<u8>>> {
        let mut tail = vec!["contents"];
        tail.extend_from_slice(path);
        let mut url = self.endpoint(repo, &tail)?;
        url.query_pairs_mut().append_pair("ref", version);
        let response = self.get(repo, url, Some("application/vnd.github.raw")).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let body = response.bytes().await.map_err(|e| transport_error(repo, &e))?;
                Ok(Some(body.to_vec()))
            }
            status => Err(status_error(repo, status)),
        }
    }

    async fn hacs_manifest(&self, repo: &RepoId, version: &str) -> Result<HacsManifest> {
        let Some(body) = self.raw_file(repo, version, &["hacs.json"]).await? else {
            return Ok(HacsManifest::default());
        };
        Ok(serde_json::from_slice(&body).unwrap_or_else(|e| {
            warn!("Ignoring unreadable hacs.json in {}@{}: {}", repo, version, e);
            HacsManifest::default()
        }))
    }

    /// The built plugin file committed under `dist/`, if any.
    async fn dist_file(&self, repo: &RepoId, version: &str) -> Result<Option<Artifact>> {
        for filename in plugin_file_names(repo) {
            if let Some(bytes) = self.raw_file(repo, version, &["dist", filename.as_str()]).await? {
                return Ok(Some(Artifact {
                    filename,
                    bytes,
                }));
            }
        }
        Ok(None)
    }

    async fn download(&self, repo: &RepoId, version: &str, url: Url) -> Result<Vec<u8>> {
        let response = self.get(repo, url, Some("application/octet-stream")).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(UnhacsError::VersionNotFound {
                repo: repo.to_string(),
                version: version.to_string(),
            }),
            status if status.is_success() => {
                let bytes = response.bytes().await.map_err(|e| transport_error(repo, &e))?;
                Ok(bytes.to_vec())
            }
            status => Err(status_error(repo, status)),
        }
    }
}

#[async_trait]
impl SourceClient for GitHubClient {
    async fn list_versions(&self, repo: &RepoId) -> Result<Vec<Release>> {
        let mut url = self.endpoint(repo, &["releases"])?;
        url.query_pairs_mut().append_pair("per_page", &RELEASES_PER_PAGE.to_string());

        let mut listed: Vec<GitHubRelease> = Vec::new();
        let mut next = Some(url);
        let mut pages = 0;
        while let Some(url) = next.take() {
            if pages == MAX_RELEASE_PAGES {
                warn!("{} lists more than {} pages of releases; ignoring the rest", repo, MAX_RELEASE_PAGES);
                break;
            }
            pages += 1;

            let response = self.get(repo, url, None).await?;
            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(UnhacsError::RepoNotFound {
                    repo: repo.to_string(),
                });
            }
            if !status.is_success() {
                return Err(status_error(repo, status));
            }

            next = next_page(response.headers());
            let page: Vec<GitHubRelease> = response.json().await.map_err(|e| transport_error(repo, &e))?;
            listed.extend(page);
        }

        let mut releases: Vec<Release> =
            listed.into_iter().filter(|r| !r.draft).map(Release::from).collect();

        // Stable: releases published at the same instant keep the API's order.
        releases.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        debug!("{} lists {} release(s) over {} page(s)", repo, releases.len(), pages);
        Ok(releases)
    }

    async fn fetch(&self, repo: &RepoId, version: &str) -> Result<Artifact> {
        let release = self.release_by_tag(repo, version).await?;
        let hacs = self.hacs_manifest(repo, version).await?;

        let asset = match hacs.filename.as_deref() {
            Some(filename) => {
                let named = release.assets.iter().find(|asset| asset.name == filename);
                if named.is_none() {
                    debug!("{}@{} has no asset named {}, using zipball", repo, version, filename);
                }
                named
            }
            None => plugin_file_names(repo)
                .into_iter()
                .find_map(|name| release.assets.iter().find(|asset| asset.name == name)),
        };

        if let Some(asset) = asset {
            let url = Url::parse(&asset.download_url).map_err(|e| UnhacsError::SourceUnavailable {
                repo: repo.to_string(),
                reason: format!("invalid asset URL {}: {e}", asset.download_url),
            })?;
            debug!("Downloading {} for {}@{}", asset.name, repo, version);
            let bytes = self.download(repo, version, url).await?;
            return Ok(Artifact {
                filename: asset.name.clone(),
                bytes,
            });
        }

        if hacs.filename.is_none()
            && let Some(artifact) = self.dist_file(repo, version).await?
        {
            debug!("Using dist/{} for {}@{}", artifact.filename, repo, version);
            return Ok(artifact);
        }

        let filename = format!("{}-{}.zip", repo.name, version);
        debug!("Downloading {} for {}@{}", filename, repo, version);
        let url = self.endpoint(repo, &["zipball", version])?;
        let bytes = self.download(repo, version, url).await?;
        Ok(Artifact {
            filename,
            bytes,
        })
    }
}

/// File names a frontend plugin conventionally publishes its build under:
/// the repository name without a `lovelace-` prefix, then the full name.
fn plugin_file_names(repo: &RepoId) -> Vec<String> {
    let short = repo.name.strip_prefix("lovelace-").unwrap_or(&repo.name);
    let mut names = vec![format!("{short}.js")];
    let full = format!("{}.js", repo.name);
    if !names.contains(&full) {
        names.push(full);
    }
    names
}

/// Target of the `rel="next"` entry of a `Link` header.
fn next_page(headers: &HeaderMap) -> Option<Url> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        let is_next = params.split(';').any(|param| param.trim() == r#"rel="next""#);
        if !is_next {
            return None;
        }
        let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
        Url::parse(target).ok()
    })
}

fn transport_error(repo: &RepoId, error: &reqwest::Error) -> UnhacsError {
    let reason = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_decode() {
        format!("invalid response body: {error}")
    } else {
        error.to_string()
    };
    UnhacsError::SourceUnavailable {
        repo: repo.to_string(),
        reason,
    }
}

fn status_error(repo: &RepoId, status: StatusCode) -> UnhacsError {
    UnhacsError::SourceUnavailable {
        repo: repo.to_string(),
        reason: format!("HTTP {status}"),
    }
}
