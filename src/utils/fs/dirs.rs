//! Directory creation and reset.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{MeshMergeError, Result};

/// Create `path` and any missing parents.
///
/// Fails if `path` exists but is not a directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| MeshMergeError::fs("creating directory", path, e))?;
    } else if !path.is_dir() {
        let error = std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "path exists but is not a directory",
        );
        return Err(MeshMergeError::fs("creating directory", path, error));
    }
    Ok(())
}

/// Create the parent directory of `path`, if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Remove `path` recursively if it exists.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| MeshMergeError::fs("removing directory", path, e))?;
    }
    Ok(())
}

/// Delete `path` with everything in it and create it again, empty.
pub fn reset_dir(path: &Path) -> Result<()> {
    remove_dir_all(path)?;
    ensure_dir(path)
}

/// Fail if any of `inputs` lives inside `dir`.
///
/// Both sides are canonicalized, so relative paths, `.` and symlinks are
/// compared by their real location. A missing `dir` cannot contain anything.
pub fn ensure_disjoint(dir: &Path, inputs: &[PathBuf]) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    let dir_real = dir.canonicalize().map_err(|e| MeshMergeError::fs("resolving", dir, e))?;
    for input in inputs {
        let input_real =
            input.canonicalize().map_err(|e| MeshMergeError::fs("resolving", input, e))?;
        if input_real.starts_with(&dir_real) {
            return Err(MeshMergeError::ConfigError {
                message: format!(
                    "Output directory '{}' contains input file '{}'; refusing to clear it",
                    dir.display(),
                    input.display()
                ),
            });
        }
    }
    Ok(())
}
