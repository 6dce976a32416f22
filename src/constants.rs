//! Global constants used throughout unhacs.
//!
//! Timeouts, retry parameters and well-known file names live here so the
//! defaults are discoverable in one place.

use std::time::Duration;

/// Manifest file name inside the Home Assistant configuration directory.
pub const DEFAULT_MANIFEST_FILE: &str = "unhacs.toml";

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// API version pinned in the `X-GitHub-Api-Version` header.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// User agent sent with every request; GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("unhacs/", env!("CARGO_PKG_VERSION"));

/// Releases requested per listing call.
pub const RELEASES_PER_PAGE: u32 = 100;

/// Upper bound on release listing pages followed for one repository.
pub const MAX_RELEASE_PAGES: usize = 50;

/// Default timeout for a single HTTP request (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of packages synchronised concurrently.
///
/// Kept low to stay well inside the unauthenticated GitHub rate limit.
pub const DEFAULT_MAX_PARALLEL: usize = 4;

/// Default number of attempts for a retryable source call (first try included).
pub const DEFAULT_RETRY_ATTEMPTS: usize = 3;

/// Starting delay for exponential backoff between source retries (200ms).
pub const STARTING_BACKOFF_DELAY_MS: u64 = 200;

/// Maximum backoff delay between source retries (5 seconds).
pub const MAX_BACKOFF_DELAY_MS: u64 = 5_000;

/// Prefix of the hidden staging directories created inside the target root.
pub const STAGING_PREFIX: &str = ".unhacs-staging";
