//! meshmerge - Service Fabric Mesh manifest merger
//!
//! Combines partial YAML documents ("fragments") describing mesh resources into
//! canonical resource descriptions, then emits them either as numbered
//! per-resource documents or as one ARM deployment template.
//!
//! # Architecture Overview
//!
//! A run flows through these stages:
//!
//! 1. [`utils::fs::discover_inputs`] expands files, directories and globs
//! 2. [`document::parser`] reads every file into a [`document::PartialDocument`]
//! 3. [`merge::MergeEngine`] folds the fragments of each `(kind, name)` into one tree
//! 4. [`parameters::ParameterSet`] fills `[parameters('<name>')]` placeholders
//! 5. [`convert::Converter`] turns string trees into typed JSON values
//! 6. [`resolver::DependencyResolver`] derives inter-resource dependencies
//! 7. [`arm::ArmTemplateGenerator`] or the per-resource writer produces output
//!
//! [`orchestrator::MergeOrchestrator`] drives all of them.
//!
//! ## Resource kinds
//!
//! Six kinds are known, always emitted in this order:
//! `secret`, `secretValue`, `volume`, `network`, `gateway`, `application`.
//!
//! # Core Modules
//!
//! - [`core`] - Error types and resource identities
//! - [`config`] - Built-in and user settings (type tables, coercion rules)
//! - [`document`] - The string-scalar document tree and its YAML parser
//! - [`merge`] - Tree merging
//! - [`convert`] - Tree to typed document conversion
//! - [`resolver`] - Dependency edges, cycle detection and creation order
//! - [`arm`] - ARM template generation
//! - [`parameters`] - Template parameter values
//! - [`orchestrator`] - End-to-end runs and plans
//! - [`cli`] - Command-line interface
//! - [`utils`] - File system helpers
//!
//! # Fragment Format
//!
//! ```yaml
//! application:
//!   schemaVersion: 1.0.0-preview2
//!   name: shop
//!   properties:
//!     services:
//!       - name: web
//!         properties:
//!           replicaCount: "2"
//!           networkRefs:
//!             - name: shopNetwork
//! ```
//!
//! A second file with `application: {name: shop, ...}` patches the same
//! resource; mappings merge recursively, scalars from later files win and
//! lists are concatenated.
//!
//! # Command-Line Usage
//!
//! ```bash
//! meshmerge merge -i manifests/ --prefix merged- --output-dir out
//! meshmerge merge -i app.yaml,network.yaml --format arm-json --parameters params.json
//! meshmerge plan -i manifests/
//! ```

pub mod arm;
pub mod cli;
pub mod config;
pub mod constants;
pub mod convert;
pub mod core;
pub mod document;
pub mod merge;
pub mod orchestrator;
pub mod parameters;
pub mod resolver;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
