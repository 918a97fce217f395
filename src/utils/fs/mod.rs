//! File system helpers for the merge pipeline
//!
//! - [`atomic`] writes output files via temp-and-rename
//! - [`dirs`] creates and resets output directories, and keeps them apart from the inputs
//! - [`discovery`] turns input entries (files, directories, globs) into a file list
//!
//! # Examples
//!
//! ```rust,no_run
//! use meshmerge_cli::utils::fs::{discover_inputs, reset_dir, safe_write};
//! use std::path::Path;
//!
//! # fn example() -> meshmerge_cli::core::Result<()> {
//! let files = discover_inputs(&["manifests/"], &["yaml".to_string()])?;
//! reset_dir(Path::new("meshDeploy"))?;
//! safe_write(Path::new("meshDeploy/summary.txt"), &format!("{} inputs", files.len()))?;
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod dirs;
pub mod discovery;

pub use atomic::{atomic_write, safe_write};
pub use dirs::{ensure_disjoint, ensure_dir, ensure_parent_dir, remove_dir_all, reset_dir};
pub use discovery::{discover_inputs, scan_dir, split_input_list};
