//! Dependency graph over merged resources.
//!
//! Edges point from a dependent resource to the resource it depends on. The
//! graph yields a creation order in which every resource comes after
//! everything it depends on. Edges only ever run from a later creation kind to
//! an earlier one, so the graph is acyclic by construction.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::core::ResourceKind;

/// One resource in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyNode {
    /// Resource kind
    pub kind: ResourceKind,
    /// Resource name as written in the documents
    pub name: String,
    /// `{ArmResourceType}/{name}`
    pub full_name: String,
}

impl DependencyNode {
    /// Create a node.
    pub fn new(kind: ResourceKind, name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            full_name: full_name.into(),
        }
    }
}

impl fmt::Display for DependencyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// Directed graph of resource dependencies
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<DependencyNode, ()>,
    node_map: HashMap<DependencyNode, NodeIndex>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `node` if it is not present yet. Insertion order breaks ties in
    /// [`Self::topological_order`].
    pub fn ensure_node(&mut self, node: DependencyNode) -> NodeIndex {
        if let Some(&index) = self.node_map.get(&node) {
            index
        } else {
            let index = self.graph.add_node(node.clone());
            self.node_map.insert(node, index);
            index
        }
    }

    /// Record that `from` depends on `to`.
    pub fn add_dependency(&mut self, from: DependencyNode, to: DependencyNode) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Nodes ordered so that dependencies come before their dependents.
    ///
    /// Among nodes that are ready at the same time, the one added first wins,
    /// so the order is stable for a given insertion order.
    pub fn topological_order(&self) -> Vec<DependencyNode> {
        let mut pending: HashMap<NodeIndex, usize> = self
            .graph
            .node_indices()
            .map(|idx| (idx, self.graph.neighbors_directed(idx, Direction::Outgoing).count()))
            .collect();
        let mut ready: BTreeSet<NodeIndex> =
            pending.iter().filter(|(_, count)| **count == 0).map(|(idx, _)| *idx).collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(idx) = ready.pop_first() {
            order.push(self.graph[idx].clone());
            for dependent in self.graph.neighbors_directed(idx, Direction::Incoming) {
                if let Some(count) = pending.get_mut(&dependent) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        debug_assert_eq!(order.len(), self.graph.node_count(), "dependency graph has a cycle");
        order
    }

    /// Direct dependencies of `node`, in insertion order.
    pub fn direct_deps(&self, node: &DependencyNode) -> Vec<DependencyNode> {
        let Some(&idx) = self.node_map.get(node) else {
            return Vec::new();
        };
        let mut deps: Vec<NodeIndex> = self.graph.neighbors(idx).collect();
        deps.sort();
        deps.into_iter().map(|dep| self.graph[dep].clone()).collect()
    }
}
