//! Unit test suite for meshmerge
//!
//! Library-level tests that drive the orchestrator directly, without the CLI.
//!
//! ```bash
//! cargo test --test unit
//! ```

#[path = "../common/mod.rs"]
mod common;

mod arm_template;
mod per_resource_output;
mod plan;
