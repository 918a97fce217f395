//! Tree merge engine
//!
//! Merges the partial documents that describe one logical resource into a
//! single canonical tree. Partials are applied in arrival order onto an empty
//! accumulator:
//!
//! - mappings take the union of their keys, in first-seen order
//! - sequences follow the configured [`SequenceMergePolicy`]
//! - scalars are overwritten by the later partial (last writer wins)
//! - any other combination of node kinds is an [`MeshMergeError::IncompatibleMerge`]
//!
//! Callers express patch precedence purely through input ordering; differing
//! scalar values are never reported as conflicts.
//!
//! # Examples
//!
//! ```rust
//! use meshmerge_cli::document::PartialDocument;
//! use meshmerge_cli::merge::MergeEngine;
//!
//! let base = PartialDocument::from_yaml_str(
//!     "network:\n  name: web\n  properties:\n    kind: Local\n",
//!     "base.yaml",
//! )
//! .unwrap();
//! let patch = PartialDocument::from_yaml_str(
//!     "network:\n  name: web\n  properties:\n    addressPrefix: 10.0.0.4/22\n",
//!     "patch.yaml",
//! )
//! .unwrap();
//!
//! let merged = MergeEngine::default().merge(&[base, patch], "network", Some("name")).unwrap();
//! let props = merged.get("network").unwrap().get("properties").unwrap();
//! assert_eq!(props.as_mapping().unwrap().len(), 2);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{MeshMergeError, ResourceIdentity, Result};
use crate::document::{DocumentNode, NodePath, PartialDocument};

/// Merged trees keyed by resource identity, in emission order.
///
/// Each value is the `{kind: body}` document produced by [`MergeEngine::merge`].
pub type MergedResourceMap = IndexMap<ResourceIdentity, DocumentNode>;

/// How sequences from later partials are combined with earlier ones
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SequenceMergePolicy {
    /// Append every element; duplicates are neither detected nor removed.
    #[default]
    Append,
    /// Patch the element whose first scalar field matches, append otherwise.
    ///
    /// A mapping element is identified by its first scalar field, normally
    /// `name`. Non-mapping elements are always appended.
    MatchByKey,
}

/// Merges partial documents of one resource into a canonical tree
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeEngine {
    sequence_policy: SequenceMergePolicy,
}

impl MergeEngine {
    /// Create an engine with the given sequence policy.
    pub const fn new(sequence_policy: SequenceMergePolicy) -> Self {
        Self {
            sequence_policy,
        }
    }

    /// Merge `partials` describing one resource of `kind`.
    ///
    /// Every partial must be a single-entry mapping keyed by `kind` whose body
    /// is a mapping. When `primary_key` is given, each body must carry that
    /// field as a scalar and all partials must agree on its value.
    ///
    /// Returns the merged `{kind: body}` tree.
    pub fn merge(
        &self,
        partials: &[PartialDocument],
        kind: &str,
        primary_key: Option<&str>,
    ) -> Result<DocumentNode> {
        let mut expected_key: Option<&str> = None;
        for partial in partials {
            let (found_kind, body) = partial.single_entry()?;
            if found_kind != kind {
                return Err(MeshMergeError::malformed(
                    &partial.source,
                    format!("expected resource kind '{kind}', found '{found_kind}'"),
                ));
            }
            if body.as_mapping().is_none() {
                return Err(MeshMergeError::malformed(
                    &partial.source,
                    format!("the {kind} body must be a mapping, found a {}", body.kind_name()),
                ));
            }

            if let Some(key) = primary_key {
                let value = body.get(key).and_then(DocumentNode::as_scalar).ok_or_else(|| {
                    MeshMergeError::MissingPrimaryKey {
                        file: partial.source.clone(),
                        kind: kind.to_string(),
                        key: key.to_string(),
                    }
                })?;
                match expected_key {
                    None => expected_key = Some(value),
                    Some(expected) if expected != value => {
                        return Err(MeshMergeError::PrimaryKeyMismatch {
                            file: partial.source.clone(),
                            kind: kind.to_string(),
                            key: key.to_string(),
                            expected: expected.to_string(),
                            found: value.to_string(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        let mut merged = DocumentNode::mapping();
        for partial in partials {
            tracing::debug!("Merging {} into {kind} resource", partial.source);
            let mut path = NodePath::new();
            self.merge_node(&mut merged, &partial.root, &mut path, &partial.source)?;
        }

        Ok(merged)
    }

    fn merge_node(
        &self,
        dest: &mut DocumentNode,
        src: &DocumentNode,
        path: &mut NodePath,
        source: &str,
    ) -> Result<()> {
        match (dest, src) {
            (DocumentNode::Mapping(dest_map), DocumentNode::Mapping(src_map)) => {
                for (key, src_child) in src_map {
                    path.push_key(key.as_str());
                    let dest_child =
                        dest_map.entry(key.clone()).or_insert_with(|| src_child.empty_like());
                    self.merge_node(dest_child, src_child, path, source)?;
                    path.pop();
                }
            }
            (DocumentNode::Sequence(dest_items), DocumentNode::Sequence(src_items)) => {
                for (index, src_item) in src_items.iter().enumerate() {
                    path.push_index(index);
                    match self.find_matching_element(dest_items, src_item) {
                        Some(position) => {
                            self.merge_node(&mut dest_items[position], src_item, path, source)?;
                        }
                        None => {
                            let mut fresh = src_item.empty_like();
                            self.merge_node(&mut fresh, src_item, path, source)?;
                            dest_items.push(fresh);
                        }
                    }
                    path.pop();
                }
            }
            (DocumentNode::Scalar(dest_value), DocumentNode::Scalar(src_value)) => {
                dest_value.clone_from(src_value);
            }
            (dest, src) => {
                return Err(MeshMergeError::IncompatibleMerge {
                    file: source.to_string(),
                    path: path.to_string(),
                    expected: dest.kind_name().to_string(),
                    found: src.kind_name().to_string(),
                });
            }
        }
        Ok(())
    }

    fn find_matching_element(
        &self,
        dest_items: &[DocumentNode],
        src_item: &DocumentNode,
    ) -> Option<usize> {
        if self.sequence_policy == SequenceMergePolicy::Append {
            return None;
        }

        let (key, value) = first_scalar_field(src_item)?;
        dest_items.iter().position(|candidate| {
            candidate.get(key).and_then(DocumentNode::as_scalar) == Some(value)
        })
    }
}

/// The first field of a mapping whose value is a scalar.
fn first_scalar_field(node: &DocumentNode) -> Option<(&str, &str)> {
    node.as_mapping()?
        .iter()
        .find_map(|(key, value)| value.as_scalar().map(|v| (key.as_str(), v)))
}
