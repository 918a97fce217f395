//! Input file discovery.
//!
//! Every input entry may be a comma-separated list. Each item is expanded
//! (`~` and environment variables) and then treated as:
//!
//! - a **file** - used as is
//! - a **directory** - scanned recursively for the configured extensions,
//!   in file-name order
//! - a **glob pattern** (contains `*`, `?` or `[`) - expanded in path order
//!
//! The result keeps first-seen order and drops duplicates.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::{MeshMergeError, Result};

/// Split comma-separated input lists into individual, trimmed items.
pub fn split_input_list<S: AsRef<str>>(inputs: &[S]) -> Vec<String> {
    inputs
        .iter()
        .flat_map(|entry| entry.as_ref().split(','))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Resolve input entries to the list of files to parse.
pub fn discover_inputs<S: AsRef<str>>(
    inputs: &[S],
    extensions: &[String],
) -> Result<Vec<PathBuf>> {
    let items = split_input_list(inputs);
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for item in &items {
        let expanded = shellexpand::full(item)
            .map_err(|e| MeshMergeError::ConfigError {
                message: format!("Cannot expand input '{item}': {e}"),
            })?
            .into_owned();
        let path = PathBuf::from(&expanded);

        let found = if path.is_file() {
            vec![path]
        } else if path.is_dir() {
            scan_dir(&path, extensions)?
        } else if is_glob(&expanded) {
            expand_glob(&expanded)?
        } else {
            return Err(MeshMergeError::fs(
                "reading input",
                &path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            ));
        };

        if found.is_empty() {
            warn!("No input files matched '{item}'");
        }
        for file in found {
            if seen.insert(file.clone()) {
                files.push(file);
            }
        }
    }

    if files.is_empty() {
        return Err(MeshMergeError::NoInputFiles {
            inputs: items.join(", "),
        });
    }
    debug!("Discovered {} input file(s)", files.len());
    Ok(files)
}

fn is_glob(item: &str) -> bool {
    item.contains('*') || item.contains('?') || item.contains('[')
}

/// Files under `dir` whose extension is one of `extensions` (case-insensitive).
pub fn scan_dir(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            let source =
                e.into_io_error().unwrap_or_else(|| std::io::Error::other("directory walk failed"));
            MeshMergeError::fs("scanning directory", &path, source)
        })?;
        if entry.file_type().is_file() && has_extension(entry.path(), extensions) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)))
}

fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|e| MeshMergeError::ConfigError {
        message: format!("Invalid glob pattern '{pattern}': {e}"),
    })?;

    let mut files = Vec::new();
    for path in paths {
        let path = path.map_err(|e| {
            let failed = e.path().to_path_buf();
            MeshMergeError::fs("reading glob match", &failed, e.into())
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}
