//! Test utilities for unhacs
//!
//! Helpers shared by unit tests and the integration suite (behind the
//! `test-utils` feature):
//! - [`init_test_logging`]: opt-in tracing output for tests
//! - [`FakeSourceClient`]: an in-memory [`crate::source::SourceClient`]
//! - [`fixtures`]: release and archive builders
//!
//! # Example
//!
//! ```rust,no_run
//! use unhacs_cli::test_utils::{FakeSourceClient, fixtures};
//!
//! let client = FakeSourceClient::new()
//!     .with_release("owner/card", fixtures::release("v1.0", 1), fixtures::js_artifact("card.js", "v1"));
//! ```

pub mod fake_source;
pub mod fixtures;

pub use fake_source::FakeSourceClient;
pub use fixtures::zip_archive;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. With `level` set, that level is used;
/// otherwise `RUST_LOG` is honoured, and without either nothing is logged.
///
/// ```bash
/// RUST_LOG=unhacs_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
