//! Tree-to-document conversion
//!
//! Turns a merged [`DocumentNode`] into an ordered `serde_json::Value` in two
//! steps:
//!
//! 1. **Plain serialization** - mappings become objects (key order kept),
//!    sequences become arrays, scalars become strings.
//! 2. **Coercion** - every configured [`PrimitivePropertyRule`] replaces the
//!    strings at its path with an integer, boolean or double.
//!
//! # Examples
//!
//! ```rust
//! use meshmerge_cli::convert::{Converter, PrimitivePropertyRule, PrimitiveType};
//! use meshmerge_cli::document::PartialDocument;
//!
//! let partial = PartialDocument::from_yaml_str(
//!     "application:\n  name: shop\n  properties:\n    replicaCount: '3'\n",
//!     "app.yaml",
//! )
//! .unwrap();
//! let converter = Converter::new(vec![PrimitivePropertyRule::new(
//!     "application/properties/replicaCount",
//!     PrimitiveType::Integer,
//! )]);
//!
//! let document = converter.convert(&partial.root).unwrap();
//! assert_eq!(document["application"]["properties"]["replicaCount"], 3);
//! ```

pub mod coercion;

pub use coercion::{PrimitivePropertyRule, PrimitiveType, coerce};

use serde_json::{Map, Value};

use crate::core::{MeshMergeError, Result};
use crate::document::DocumentNode;

/// Converts merged trees into typed output documents
#[derive(Debug, Clone, Default)]
pub struct Converter {
    rules: Vec<PrimitivePropertyRule>,
}

impl Converter {
    /// Create a converter applying `rules` in order.
    pub fn new(rules: Vec<PrimitivePropertyRule>) -> Self {
        Self {
            rules,
        }
    }

    /// Serialize `node` and apply every coercion rule.
    pub fn convert(&self, node: &DocumentNode) -> Result<Value> {
        let mut document = to_value(node);
        for rule in &self.rules {
            rule.apply(&mut document)?;
        }
        Ok(document)
    }

    /// Serialize and coerce, then return the resource body `document.<kind>`,
    /// narrowed to `document.<kind>.<filter_key>` when a filter is given.
    pub fn convert_filtered(
        &self,
        node: &DocumentNode,
        kind: &str,
        filter_key: Option<&str>,
    ) -> Result<Value> {
        let document = self.convert(node)?;
        match (filter_key, document) {
            (Some(key), document) => Self::select(document, kind, key),
            (None, Value::Object(mut root)) => Ok(root.remove(kind).unwrap_or(Value::Null)),
            (None, other) => Ok(other),
        }
    }

    /// Replace `document` with the value found at `document.<kind>.<filter_key>`.
    pub fn select(document: Value, kind: &str, filter_key: &str) -> Result<Value> {
        let Value::Object(mut root) = document else {
            return Err(MeshMergeError::malformed(kind, "converted document is not an object"));
        };
        let Some(Value::Object(mut body)) = root.remove(kind) else {
            return Err(MeshMergeError::malformed(
                kind,
                format!("converted document has no '{kind}' object"),
            ));
        };
        body.remove(filter_key).ok_or_else(|| {
            MeshMergeError::malformed(kind, format!("resource body has no '{filter_key}' field"))
        })
    }
}

/// Plain structural serialization of a document tree.
pub fn to_value(node: &DocumentNode) -> Value {
    match node {
        DocumentNode::Mapping(map) => {
            let mut object = Map::with_capacity(map.len());
            for (key, child) in map {
                object.insert(key.clone(), to_value(child));
            }
            Value::Object(object)
        }
        DocumentNode::Sequence(items) => Value::Array(items.iter().map(to_value).collect()),
        DocumentNode::Scalar(value) => Value::String(value.clone()),
    }
}
