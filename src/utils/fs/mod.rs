//! File system utilities.
//!
//! - [`atomic`]: write-then-rename file writes
//! - [`dirs`]: directory creation, removal and moves
//! - [`temp`]: self-cleaning staging directories

pub mod atomic;
pub mod dirs;
pub mod temp;

pub use atomic::{atomic_write, safe_write};
pub use dirs::{ensure_dir, remove_dir_all, rename};
pub use temp::StagingDir;
