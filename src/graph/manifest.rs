//! Resolved edge storage.
//!
//! [`ManifestGraph`] wraps a `petgraph::Graph` whose nodes are the resource identity keys
//! (added in resource-set order) and whose edge weights are [`RelationKind`]s (added in
//! resolution order). Edges are never removed, so `raw_edges()` order is resolution order.

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

use super::ResourceSet;
use crate::properties::{RelationKind, ResourceKey};

/// A resolved, concrete reference between two existing resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: ResourceKey,
    pub target: ResourceKey,
    pub relation: RelationKind,
}

impl Display for Edge {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} -[{}]-> {}", self.source, self.relation, self.target)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ManifestGraph {
    graph: DiGraph<ResourceKey, RelationKind>,
    nodes: BTreeMap<ResourceKey, NodeIndex>,
}

impl ManifestGraph {
    /// One node per resource, no edges.
    pub fn new(resources: &ResourceSet) -> Self {
        let mut graph = DiGraph::with_capacity(resources.len(), 0);
        let mut nodes = BTreeMap::new();
        for resource in resources.iter() {
            let key = resource.key();
            let idx = graph.add_node(key.clone());
            nodes.insert(key, idx);
        }
        ManifestGraph { graph, nodes }
    }

    pub fn as_graph(&self) -> &DiGraph<ResourceKey, RelationKind> {
        &self.graph
    }

    pub fn node(&self, key: &ResourceKey) -> Option<NodeIndex> {
        self.nodes.get(key).copied()
    }

    /// Add an edge between two known nodes. Returns false if either endpoint is unknown.
    pub fn add_edge(&mut self, edge: &Edge) -> bool {
        match (self.node(&edge.source), self.node(&edge.target)) {
            (Some(source), Some(target)) => {
                self.graph.add_edge(source, target, edge.relation);
                true
            }
            _ => false,
        }
    }

    /// Every edge, in the order it was resolved. Repeated facts yield repeated edges.
    pub fn edges(&self) -> Vec<Edge> {
        self.graph
            .raw_edges()
            .iter()
            .map(|edge| Edge {
                source: self.graph[edge.source()].clone(),
                target: self.graph[edge.target()].clone(),
                relation: edge.weight,
            })
            .collect()
    }

    /// Edges leaving `key`, in resolution order.
    pub fn outgoing(&self, key: &ResourceKey) -> Vec<(&ResourceKey, RelationKind)> {
        let Some(idx) = self.node(key) else {
            return Vec::new();
        };
        self.graph
            .raw_edges()
            .iter()
            .filter(|edge| edge.source() == idx)
            .map(|edge| (&self.graph[edge.target()], edge.weight))
            .collect()
    }

    /// Edges arriving at `key`, in resolution order.
    pub fn incoming(&self, key: &ResourceKey) -> Vec<(&ResourceKey, RelationKind)> {
        let Some(idx) = self.node(key) else {
            return Vec::new();
        };
        self.graph
            .raw_edges()
            .iter()
            .filter(|edge| edge.target() == idx)
            .map(|edge| (&self.graph[edge.source()], edge.weight))
            .collect()
    }

    /// Resources that take part in no edge at all.
    pub fn isolated(&self) -> Vec<&ResourceKey> {
        self.graph
            .node_indices()
            .filter(|idx| {
                self.graph
                    .neighbors_undirected(*idx)
                    .next()
                    .is_none()
            })
            .map(|idx| &self.graph[idx])
            .collect()
    }

    /// (node count, edge count)
    pub fn stats(&self) -> (usize, usize) {
        (self.graph.node_count(), self.graph.edge_count())
    }
}
