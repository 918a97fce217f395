//! Generic document tree
//!
//! Parsed input files are held as a [`DocumentNode`] tree independent of any
//! serialization format. Every leaf is a string until the converter applies
//! type coercion, which keeps merging purely structural.
//!
//! # Examples
//!
//! ```rust
//! use meshmerge_cli::document::{DocumentNode, PartialDocument};
//!
//! let partial = PartialDocument::from_yaml_str(
//!     "network:\n  name: frontend\n  properties:\n    addressPrefix: 10.0.0.4/22\n",
//!     "network.yaml",
//! )
//! .unwrap();
//!
//! let (kind, body) = partial.single_entry().unwrap();
//! assert_eq!(kind, "network");
//! assert_eq!(body.get("name"), Some(&DocumentNode::scalar("frontend")));
//! ```

pub mod parser;

use indexmap::IndexMap;
use std::fmt;

use crate::core::{MeshMergeError, Result};

/// Ordered mapping used by [`DocumentNode::Mapping`].
pub type Mapping = IndexMap<String, DocumentNode>;

/// A node of a parsed document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentNode {
    /// Ordered key/value pairs with unique keys
    Mapping(Mapping),
    /// Ordered list of nodes
    Sequence(Vec<DocumentNode>),
    /// A single textual value
    Scalar(String),
}

impl DocumentNode {
    /// Create a scalar node.
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    /// Create an empty mapping node.
    pub fn mapping() -> Self {
        Self::Mapping(Mapping::new())
    }

    /// A fresh, empty node of the same variant as `self`.
    pub fn empty_like(&self) -> Self {
        match self {
            Self::Mapping(_) => Self::Mapping(Mapping::new()),
            Self::Sequence(_) => Self::Sequence(Vec::new()),
            Self::Scalar(_) => Self::Scalar(String::new()),
        }
    }

    /// Human-readable variant name used in diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Mapping(_) => "mapping",
            Self::Sequence(_) => "sequence",
            Self::Scalar(_) => "scalar",
        }
    }

    /// The scalar value, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// The mapping entries, if this is a mapping.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` in a mapping node.
    pub fn get(&self, key: &str) -> Option<&DocumentNode> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Visit every scalar leaf mutably, in document order.
    ///
    /// The callback may replace the scalar with any node; a replacement is
    /// not visited again.
    pub fn visit_scalars_mut<F>(&mut self, f: &mut F)
    where
        F: FnMut(&mut DocumentNode),
    {
        match self {
            Self::Mapping(map) => {
                for child in map.values_mut() {
                    child.visit_scalars_mut(f);
                }
            }
            Self::Sequence(items) => {
                for child in items {
                    child.visit_scalars_mut(f);
                }
            }
            Self::Scalar(_) => f(self),
        }
    }

    /// Build a tree from a JSON value, stringifying every primitive.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Scalar(String::new()),
            Value::Bool(b) => Self::Scalar(b.to_string()),
            Value::Number(n) => Self::Scalar(n.to_string()),
            Value::String(s) => Self::Scalar(s.clone()),
            Value::Array(items) => Self::Sequence(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Mapping(
                map.iter().map(|(key, child)| (key.clone(), Self::from_json(child))).collect(),
            ),
        }
    }
}

/// One input file's parsed content describing (part of) one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialDocument {
    /// Parsed document root, a single-entry mapping keyed by resource kind
    pub root: DocumentNode,
    /// Source file name used in diagnostics
    pub source: String,
}

impl PartialDocument {
    /// Wrap an already parsed tree.
    pub fn new(root: DocumentNode, source: impl Into<String>) -> Self {
        Self {
            root,
            source: source.into(),
        }
    }

    /// Parse a partial document from YAML (or JSON) text.
    pub fn from_yaml_str(content: &str, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let root = parser::parse_document(content, &source)?;
        Ok(Self::new(root, source))
    }

    /// The single `(kind, body)` entry of the root mapping.
    ///
    /// Fails with [`MeshMergeError::MalformedDocument`] unless the root is a
    /// mapping with exactly one entry.
    pub fn single_entry(&self) -> Result<(&str, &DocumentNode)> {
        let map = self.root.as_mapping().ok_or_else(|| {
            MeshMergeError::malformed(
                &self.source,
                format!("expected a mapping at the document root, found a {}", self.root.kind_name()),
            )
        })?;
        if map.len() != 1 {
            return Err(MeshMergeError::malformed(
                &self.source,
                format!("expected exactly one top-level resource kind, found {}", map.len()),
            ));
        }
        map.iter()
            .next()
            .map(|(kind, body)| (kind.as_str(), body))
            .ok_or_else(|| MeshMergeError::malformed(&self.source, "document is empty"))
    }

    /// The scalar value of `key` in the resource body, if present.
    pub fn primary_key_value(&self, key: &str) -> Result<Option<&str>> {
        let (_, body) = self.single_entry()?;
        Ok(body.get(key).and_then(DocumentNode::as_scalar))
    }
}

/// A single step of a [`NodePath`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

/// Location of a node inside a document, rendered as `a/b[1]/c`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath {
    segments: Vec<PathSegment>,
}

impl NodePath {
    /// Empty path (the document root).
    pub fn new() -> Self {
        Self::default()
    }

    /// Descend into a mapping key.
    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(PathSegment::Key(key.into()));
    }

    /// Descend into a sequence element.
    pub fn push_index(&mut self, index: usize) {
        self.segments.push(PathSegment::Index(index));
    }

    /// Step back to the parent.
    pub fn pop(&mut self) {
        self.segments.pop();
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{key}")?,
                PathSegment::Key(key) => write!(f, "/{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
