//! Core types shared by every unhacs component.
//!
//! - [`error`]: the [`UnhacsError`] taxonomy and CLI error rendering
//! - [`category`]: the closed set of package categories and where each installs

pub mod category;
pub mod error;

pub use category::PackageCategory;
pub use error::{ErrorContext, ErrorKind, Result, UnhacsError, user_friendly_error};
