//! Integration test suite for unhacs
//!
//! End-to-end tests that drive the public API and the `unhacs` binary. No test
//! touches the network: GitHub is replaced either by a local `httpmock` server
//! or by the in-memory `FakeSourceClient`.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: The binary's commands, exit codes and output
//! - **github_client**: The GitHub REST client against a mock server
//! - **sync_flow**: Manifest, resolver, installer and engine working together

mod cli;
mod github_client;
mod sync_flow;
