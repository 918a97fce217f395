//! Path-based primitive type coercion.
//!
//! Merged documents carry every leaf as a string. A [`PrimitivePropertyRule`]
//! names a path from the document root and the type the string found there
//! must be converted to. Paths traverse arrays transparently: at any depth,
//! including the leaf itself, an array fans the remaining path out over each
//! of its elements.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

use crate::core::{MeshMergeError, Result};

/// Target type of a coercion rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// Base-10 signed 64-bit integer
    Integer,
    /// `true` only for the literal strings `"true"` and `"True"`
    Boolean,
    /// Finite 64-bit float
    Double,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Double => "double",
        })
    }
}

/// A configured `(path, type)` coercion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitivePropertyRule {
    /// `/`-separated key names starting at the resource kind,
    /// e.g. `application/properties/services/properties/replicaCount`
    pub path: String,
    /// Type to coerce to
    #[serde(rename = "type")]
    pub target: PrimitiveType,
}

impl PrimitivePropertyRule {
    /// Create a rule.
    pub fn new(path: impl Into<String>, target: PrimitiveType) -> Self {
        Self {
            path: path.into(),
            target,
        }
    }

    /// Path segments, ignoring empty components from leading or doubled slashes.
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Apply this rule to every match in `document`.
    pub fn apply(&self, document: &mut Value) -> Result<()> {
        let segments = self.segments();
        if segments.is_empty() {
            return Ok(());
        }
        self.apply_at(document, &segments)
    }

    fn apply_at(&self, value: &mut Value, segments: &[&str]) -> Result<()> {
        match value {
            Value::Array(items) => {
                for item in items {
                    self.apply_at(item, segments)?;
                }
            }
            Value::Object(map) => {
                if let Some((head, rest)) = segments.split_first()
                    && let Some(child) = map.get_mut(*head)
                {
                    self.apply_at(child, rest)?;
                }
            }
            Value::String(raw) if segments.is_empty() => {
                *value = coerce(raw, self.target, &self.path)?;
            }
            _ => {}
        }
        Ok(())
    }
}

/// Coerce one raw string to `target`.
pub fn coerce(raw: &str, target: PrimitiveType, path: &str) -> Result<Value> {
    let error = || MeshMergeError::CoercionError {
        path: path.to_string(),
        value: raw.to_string(),
        target: target.to_string(),
    };

    match target {
        PrimitiveType::Integer => raw.trim().parse::<i64>().map(Value::from).map_err(|_| error()),
        // Only these two spellings are true; "TRUE", "yes" and "1" are all false.
        PrimitiveType::Boolean => Ok(Value::Bool(raw == "true" || raw == "True")),
        PrimitiveType::Double => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(error),
    }
}
