//! Configuration for merge runs
//!
//! All tables the pipeline consults (schema version to API version, kind to
//! ARM resource type, primitive coercion rules) are plain data loaded once
//! and injected into the components that need them. Nothing is kept in
//! global state, so tests can hand in fixture tables.
//!
//! # Layering
//!
//! 1. **Built-in settings** - embedded `builtin_settings.toml`
//! 2. **User overlay** - `--settings <FILE>` or the `MESHMERGE_SETTINGS` variable
//!
//! ```toml
//! primary_key = "name"
//! input_extensions = ["yaml", "yml"]
//!
//! [api_versions]
//! "1.0.0-preview2" = "2018-09-01-preview"
//!
//! [arm_types."1.0.0-preview2"]
//! network = "Microsoft.ServiceFabricMesh/networks"
//!
//! [[primitive_properties]]
//! path = "application/properties/services/properties/replicaCount"
//! type = "integer"
//! ```
//!
//! Tables in the overlay are merged key by key into the built-ins; arrays such
//! as `primitive_properties` replace the built-in list entirely.

pub mod parser;
pub mod settings;

pub use settings::{MergeSettings, ResourceTypeTable, SETTINGS_ENV_VAR};
