//! Common test utilities for meshmerge test suites

// Not every suite uses every helper
#![allow(dead_code)]

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use meshmerge_cli::test_utils::ManifestFixture;

/// A temporary project with a `manifests/` input directory and an `out/` target
pub struct TestProject {
    temp_dir: TempDir,
}

impl TestProject {
    /// Empty project.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temp dir")?;
        fs::create_dir_all(temp_dir.path().join("manifests"))?;
        Ok(Self {
            temp_dir,
        })
    }

    /// Project holding the sample fragment set.
    pub fn with_samples() -> Result<Self> {
        let project = Self::new()?;
        ManifestFixture::write_all(&ManifestFixture::sample_set(), &project.manifests_dir())?;
        Ok(project)
    }

    /// Project root.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory holding input fragments.
    pub fn manifests_dir(&self) -> PathBuf {
        self.path().join("manifests")
    }

    /// Output directory used by the tests.
    pub fn out_dir(&self) -> PathBuf {
        self.path().join("out")
    }

    /// Write a fragment into `manifests/`.
    pub fn write_manifest(&self, name: &str, content: &str) -> Result<PathBuf> {
        ManifestFixture::new(name, content).write_to(&self.manifests_dir())
    }

    /// Write an arbitrary file relative to the project root.
    pub fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path().join(name);
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Names of the files in `out/`, sorted.
    pub fn output_files(&self) -> Result<Vec<String>> {
        let mut names = fs::read_dir(self.out_dir())?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<std::io::Result<Vec<_>>>()?;
        names.sort();
        Ok(names)
    }

    /// Parse a JSON output file.
    pub fn read_json(&self, name: &str) -> Result<serde_json::Value> {
        let path = self.out_dir().join(name);
        let content =
            fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
    }
}
