//! Atomic file writes using a temp-and-rename strategy.
//!
//! Readers of the target path see either the previous content or the new
//! content, never a partially written file.

use std::fs;
use std::io::Write;
use std::path::Path;

use super::dirs::ensure_parent_dir;
use crate::core::{MeshMergeError, Result};

/// Write a string atomically.
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Write bytes atomically, creating parent directories as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;

    let mut temp_name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    {
        let mut file = fs::File::create(&temp_path)
            .map_err(|e| MeshMergeError::fs("creating temp file", &temp_path, e))?;
        file.write_all(content)
            .map_err(|e| MeshMergeError::fs("writing temp file", &temp_path, e))?;
        file.sync_all().map_err(|e| MeshMergeError::fs("syncing temp file", &temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        MeshMergeError::fs("renaming temp file", path, e)
    })
}
