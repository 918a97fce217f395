//! Static dependency resolution between merged resources.
//!
//! Dependencies are derived from resource kinds alone, never from document
//! content:
//!
//! | kind          | depends on                               |
//! |---------------|------------------------------------------|
//! | `application` | every `network`, `secretValue`, `volume` |
//! | `volume`      | every `secretValue`                      |
//! | `secretValue` | every `secret`                           |
//! | others        | nothing                                  |
//!
//! Edges are expressed in fully-qualified names, `{ArmResourceType}/{name}`,
//! where the ARM type comes from the injected [`ResourceTypeTable`] keyed by
//! the resource's `schemaVersion`.
//!
//! # Examples
//!
//! ```rust
//! use meshmerge_cli::config::MergeSettings;
//! use meshmerge_cli::core::{ResourceIdentity, ResourceKind};
//! use meshmerge_cli::document::PartialDocument;
//! use meshmerge_cli::merge::MergedResourceMap;
//! use meshmerge_cli::resolver::DependencyResolver;
//!
//! let table = MergeSettings::builtin().unwrap().type_table();
//! let doc = |yaml: &str| PartialDocument::from_yaml_str(yaml, "inline").unwrap().root;
//!
//! let mut resources = MergedResourceMap::new();
//! resources.insert(
//!     ResourceIdentity::new(ResourceKind::Network, "net"),
//!     doc("network:\n  name: net\n  schemaVersion: 1.0.0-preview2\n"),
//! );
//! resources.insert(
//!     ResourceIdentity::new(ResourceKind::Application, "app"),
//!     doc("application:\n  name: app\n  schemaVersion: 1.0.0-preview2\n"),
//! );
//!
//! let edges = DependencyResolver::new(&table).resolve(&resources).unwrap();
//! assert_eq!(
//!     edges["Microsoft.ServiceFabricMesh/applications/app"],
//!     vec!["Microsoft.ServiceFabricMesh/networks/net".to_string()]
//! );
//! ```

pub mod dependency_graph;

pub use dependency_graph::{DependencyGraph, DependencyNode};

use indexmap::IndexMap;
use tracing::debug;

use crate::config::ResourceTypeTable;
use crate::core::{ResourceIdentity, Result};
use crate::document::DocumentNode;
use crate::merge::MergedResourceMap;

/// Full resource name → full names of the resources it depends on.
///
/// Every resource has an entry, possibly empty. Both keys and dependency
/// lists follow the order of the input map.
pub type DependencyEdgeSet = IndexMap<String, Vec<String>>;

/// The `schemaVersion` field of a merged `{kind: body}` document.
pub fn schema_version<'a>(
    identity: &ResourceIdentity,
    document: &'a DocumentNode,
) -> Option<&'a str> {
    document
        .get(identity.kind.as_str())
        .and_then(|body| body.get("schemaVersion"))
        .and_then(DocumentNode::as_scalar)
}

/// Computes dependency edges for a batch of merged resources
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    types: &'a ResourceTypeTable,
}

impl<'a> DependencyResolver<'a> {
    /// Create a resolver over `types`.
    pub fn new(types: &'a ResourceTypeTable) -> Self {
        Self {
            types,
        }
    }

    /// `{ArmResourceType}/{name}` of one merged resource.
    pub fn full_name(
        &self,
        identity: &ResourceIdentity,
        document: &DocumentNode,
    ) -> Result<String> {
        self.types.full_name(identity.kind, schema_version(identity, document), &identity.name)
    }

    /// Compute the edge set for `resources`.
    pub fn resolve(&self, resources: &MergedResourceMap) -> Result<DependencyEdgeSet> {
        let graph = self.build_graph(resources)?;
        let mut edges = DependencyEdgeSet::with_capacity(resources.len());
        for node in self.nodes(resources)? {
            let deps = graph.direct_deps(&node).into_iter().map(|dep| dep.full_name).collect();
            edges.insert(node.full_name, deps);
        }
        Ok(edges)
    }

    /// Resources in an order where each comes after everything it depends on.
    ///
    /// Resources that do not depend on each other keep their map order.
    pub fn creation_order(&self, resources: &MergedResourceMap) -> Result<Vec<DependencyNode>> {
        Ok(self.build_graph(resources)?.topological_order())
    }

    /// Build the dependency graph.
    pub fn build_graph(&self, resources: &MergedResourceMap) -> Result<DependencyGraph> {
        let nodes = self.nodes(resources)?;
        let mut graph = DependencyGraph::new();

        for node in &nodes {
            graph.ensure_node(node.clone());
        }
        for node in &nodes {
            for target_kind in node.kind.depends_on() {
                for target in nodes.iter().filter(|n| n.kind == *target_kind) {
                    debug!("{} depends on {}", node.full_name, target.full_name);
                    graph.add_dependency(node.clone(), target.clone());
                }
            }
        }

        Ok(graph)
    }

    fn nodes(&self, resources: &MergedResourceMap) -> Result<Vec<DependencyNode>> {
        resources
            .iter()
            .map(|(identity, document)| {
                let full_name = self.full_name(identity, document)?;
                Ok(DependencyNode::new(identity.kind, identity.name.clone(), full_name))
            })
            .collect()
    }
}
