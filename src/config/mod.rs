//! Configuration for unhacs.
//!
//! Only user-wide settings live here ([`GlobalConfig`]). Per-run settings such
//! as the target directory travel explicitly in
//! [`SyncOptions`](crate::sync::SyncOptions).

mod global;

pub use global::GlobalConfig;
