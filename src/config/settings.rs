//! Merge settings and the resource type table.
//!
//! Settings are layered: the embedded `builtin_settings.toml` provides the
//! defaults, and an optional user file is overlaid on top of it before the
//! result is deserialized into [`MergeSettings`].

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::parser::{from_table, overlay_table, parse_table, read_table};
use crate::convert::PrimitivePropertyRule;
use crate::core::{MeshMergeError, ResourceKind, Result};

/// Environment variable naming a settings file to overlay on the built-ins.
pub const SETTINGS_ENV_VAR: &str = "MESHMERGE_SETTINGS";

const BUILTIN_SETTINGS: &str = include_str!("builtin_settings.toml");

/// All tunables of a merge run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeSettings {
    /// Field identifying a resource inside its body, `name` by default.
    pub primary_key: String,
    /// File extensions picked up when scanning input directories.
    pub input_extensions: Vec<String>,
    /// schemaVersion → ARM apiVersion.
    pub api_versions: IndexMap<String, String>,
    /// schemaVersion → kind → ARM resource type.
    pub arm_types: IndexMap<String, IndexMap<String, String>>,
    /// Coercion rules applied to converted documents.
    #[serde(default)]
    pub primitive_properties: Vec<PrimitivePropertyRule>,
}

impl MergeSettings {
    /// The embedded defaults.
    pub fn builtin() -> Result<Self> {
        let table = parse_table(BUILTIN_SETTINGS, "built-in settings")?;
        from_table(table, "built-in settings")
    }

    /// Load the built-in settings, overlaid with `path` when given.
    ///
    /// Without an explicit path, the file named by `MESHMERGE_SETTINGS` is
    /// used if that variable is set and non-empty.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_with_overlay(path),
            None => match std::env::var(SETTINGS_ENV_VAR) {
                Ok(value) if !value.trim().is_empty() => {
                    let expanded = shellexpand::tilde(value.trim()).into_owned();
                    Self::load_with_overlay(Path::new(&expanded))
                }
                _ => Self::builtin(),
            },
        }
    }

    /// Overlay the settings file at `path` on the built-ins.
    pub fn load_with_overlay(path: &Path) -> Result<Self> {
        debug!("Loading settings overlay from {}", path.display());
        let mut table = parse_table(BUILTIN_SETTINGS, "built-in settings")?;
        overlay_table(&mut table, read_table(path)?);
        let settings: Self = from_table(table, &path.display().to_string())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.primary_key.trim().is_empty() {
            return Err(MeshMergeError::ConfigError {
                message: "primary_key must not be empty".to_string(),
            });
        }
        for (schema_version, types) in &self.arm_types {
            for kind in types.keys() {
                kind.parse::<ResourceKind>().map_err(|_| MeshMergeError::ConfigError {
                    message: format!(
                        "arm_types.\"{schema_version}\" names unknown resource kind '{kind}'"
                    ),
                })?;
            }
        }
        Ok(())
    }

    /// Build the lookup table injected into the resolver and generator.
    pub fn type_table(&self) -> ResourceTypeTable {
        ResourceTypeTable::new(self.api_versions.clone(), self.arm_types.clone())
    }
}

/// Static `(kind, schemaVersion)` → ARM type and `schemaVersion` → apiVersion lookups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTypeTable {
    api_versions: IndexMap<String, String>,
    arm_types: IndexMap<String, IndexMap<String, String>>,
}

impl ResourceTypeTable {
    /// Build a table from raw maps.
    pub fn new(
        api_versions: IndexMap<String, String>,
        arm_types: IndexMap<String, IndexMap<String, String>>,
    ) -> Self {
        Self {
            api_versions,
            arm_types,
        }
    }

    /// ARM resource type for `kind` at `schema_version`.
    pub fn arm_type(&self, kind: ResourceKind, schema_version: Option<&str>) -> Result<&str> {
        schema_version
            .and_then(|version| self.arm_types.get(version))
            .and_then(|types| types.get(kind.as_str()))
            .map(String::as_str)
            .ok_or_else(|| MeshMergeError::UnknownResourceType {
                kind: kind.to_string(),
                schema_version: schema_version.map(str::to_string),
            })
    }

    /// ARM apiVersion for `schema_version`.
    pub fn api_version(&self, kind: ResourceKind, schema_version: Option<&str>) -> Result<&str> {
        schema_version
            .and_then(|version| self.api_versions.get(version))
            .map(String::as_str)
            .ok_or_else(|| MeshMergeError::UnknownResourceType {
                kind: kind.to_string(),
                schema_version: schema_version.map(str::to_string),
            })
    }

    /// `{ArmResourceType}/{name}` for a resource.
    pub fn full_name(
        &self,
        kind: ResourceKind,
        schema_version: Option<&str>,
        name: &str,
    ) -> Result<String> {
        Ok(format!("{}/{name}", self.arm_type(kind, schema_version)?))
    }
}
