//! Core types for meshmerge
//!
//! This module holds the types shared by every pipeline stage:
//!
//! - [`MeshMergeError`] and [`ErrorContext`] - typed errors and their
//!   user-facing presentation (see [`error`])
//! - [`ResourceKind`] and [`ResourceIdentity`] - the fixed resource kinds and
//!   the `(kind, name)` identity partial documents are grouped by (see [`resource`])
//!
//! # Examples
//!
//! ```rust
//! use meshmerge_cli::core::{ResourceIdentity, ResourceKind};
//!
//! let id = ResourceIdentity::new(ResourceKind::Application, "shop");
//! assert_eq!(id.to_string(), "application/shop");
//! ```

pub mod error;
pub mod resource;

pub use error::{ErrorContext, MeshMergeError, Result, user_friendly_error};
pub use resource::{ResourceIdentity, ResourceKind};
