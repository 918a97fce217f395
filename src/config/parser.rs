//! TOML loading and layering helpers for settings files.

use std::path::Path;

use toml::{Table, Value};

use crate::core::{MeshMergeError, Result};

/// Parse a TOML string into a table, labelling errors with `origin`.
pub fn parse_table(content: &str, origin: &str) -> Result<Table> {
    content.parse::<Table>().map_err(|e| MeshMergeError::ConfigError {
        message: format!("Failed to parse settings from {origin}: {}", e.message()),
    })
}

/// Read and parse a TOML settings file.
pub fn read_table(path: &Path) -> Result<Table> {
    let content =
        std::fs::read_to_string(path).map_err(|e| MeshMergeError::fs("reading", path, e))?;
    parse_table(&content, &path.display().to_string())
}

/// Layer `overlay` on top of `base`.
///
/// Nested tables are merged key by key; any other value (including arrays)
/// in `overlay` replaces the one in `base`.
pub fn overlay_table(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(existing)), Value::Table(incoming)) => {
                overlay_table(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Deserialize a layered table into its typed form.
pub fn from_table<T>(table: Table, origin: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    Value::Table(table).try_into().map_err(|e: toml::de::Error| MeshMergeError::ConfigError {
        message: format!("Invalid settings in {origin}: {}", e.message()),
    })
}
