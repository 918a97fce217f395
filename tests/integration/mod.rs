//! Integration test suite for meshmerge
//!
//! End-to-end tests that run the `meshmerge` binary.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **merge_command**: `merge` in every output format
//! - **plan_command**: `plan` text and JSON output
//! - **error_scenarios**: failures and their messages

#[path = "../common/mod.rs"]
mod common;

mod error_scenarios;
mod plan_command;

use assert_cmd::Command;

/// The binary with a clean environment for deterministic output.
pub fn meshmerge() -> Command {
    let mut cmd = Command::cargo_bin("meshmerge").unwrap();
    cmd.env_remove("MESHMERGE_SETTINGS").env_remove("RUST_LOG").env("NO_COLOR", "1");
    cmd
}
