//! Cross-cutting utilities.
//!
//! - [`fs`]: atomic writes, directory helpers and staging directories
//! - [`progress`]: terminal progress bars for the CLI

pub mod fs;
pub mod progress;

pub use fs::{atomic_write, ensure_dir, safe_write};
pub use progress::ProgressBar;
