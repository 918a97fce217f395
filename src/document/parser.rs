//! Parsing structured-data text into [`DocumentNode`] trees.
//!
//! Input files are read with `serde_yaml`, which also accepts JSON. Every
//! scalar is kept as text: booleans become `"true"`/`"false"`, numbers keep
//! their textual form and `null` becomes the empty string.

use serde_yaml::Value;
use std::path::Path;

use super::{DocumentNode, Mapping, PartialDocument};
use crate::core::{MeshMergeError, Result};

/// Parse `content` into a document tree.
///
/// `source` names the input in error messages.
pub fn parse_document(content: &str, source: &str) -> Result<DocumentNode> {
    let value: Value = serde_yaml::from_str(content).map_err(|e| MeshMergeError::ParseError {
        file: source.to_string(),
        reason: e.to_string(),
    })?;

    match value {
        Value::Null => Err(MeshMergeError::malformed(source, "document is empty")),
        Value::Mapping(_) => from_yaml_value(value, source),
        other => Err(MeshMergeError::malformed(
            source,
            format!("expected a mapping at the document root, found {}", describe(&other)),
        )),
    }
}

/// Read and parse a partial document from disk.
pub fn read_partial_document(path: &Path) -> Result<PartialDocument> {
    let content =
        std::fs::read_to_string(path).map_err(|e| MeshMergeError::fs("reading", path, e))?;
    let source = path.display().to_string();
    tracing::debug!("Parsing partial document {source}");
    PartialDocument::from_yaml_str(&content, source)
}

/// Convert an arbitrary `serde_yaml` value into a document tree.
pub fn from_yaml_value(value: Value, source: &str) -> Result<DocumentNode> {
    Ok(match value {
        Value::Null => DocumentNode::Scalar(String::new()),
        Value::Bool(b) => DocumentNode::Scalar(b.to_string()),
        Value::Number(n) => DocumentNode::Scalar(n.to_string()),
        Value::String(s) => DocumentNode::Scalar(s),
        Value::Sequence(items) => DocumentNode::Sequence(
            items.into_iter().map(|item| from_yaml_value(item, source)).collect::<Result<_>>()?,
        ),
        Value::Mapping(entries) => {
            let mut map = Mapping::with_capacity(entries.len());
            for (key, child) in entries {
                let key = scalar_key(key, source)?;
                map.insert(key, from_yaml_value(child, source)?);
            }
            DocumentNode::Mapping(map)
        }
        Value::Tagged(tagged) => from_yaml_value(tagged.value, source)?,
    })
}

fn scalar_key(key: Value, source: &str) -> Result<String> {
    match key {
        Value::String(s) => Ok(s),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(MeshMergeError::malformed(
            source,
            format!("mapping keys must be scalars, found {}", describe(&other)),
        )),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
