/*!
# Netrics Graph Types

This module defines the core graph type used across the engine: an undirected,
weighted, simple graph with an adjacency index. The `Graph` struct is a wrapper
around petgraph's `UnGraphMap` that adds the validation the engine relies on
(no self-loops, strictly positive weights, last-write-wins on duplicate edges)
and a uniform API for the algorithm modules.

Node and neighbour iteration follow insertion order, which is the canonical
tie-break whenever an algorithm must pick among equal candidates.

# Examples

```rust
use netrics::core::types::{Graph, NodeId};

let mut g = Graph::new();
let a = NodeId::new(0);
let b = NodeId::new(1);
g.add_edge(a, b, 1.0).unwrap();
assert_eq!(g.degree(a), 1);
assert!(g.add_edge(a, a, 1.0).is_err());
```
*/

use std::collections::HashMap;
use std::fmt;

use petgraph::graphmap::UnGraphMap;
use serde::{Deserialize, Serialize};

use crate::core::error::Error;

/// Opaque node identifier: dense indices allocated in first-appearance order
/// by the analysis facade's interner (or directly by callers building graphs
/// by hand).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a node identifier from a raw index.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the numeric part of the identifier.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Type alias for a [`HashMap`] keyed by [`NodeId`].
pub type NodeMap<T> = HashMap<NodeId, T>;

/// An undirected, weighted, simple graph.
///
/// Invariants maintained by construction:
/// - every edge's endpoints are present in the node set;
/// - the adjacency index is symmetric;
/// - no self-loops, no parallel edges, all weights strictly positive;
/// - removing a node removes all incident edges atomically.
#[derive(Debug, Clone)]
pub struct Graph {
    inner: UnGraphMap<NodeId, f64>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self {
            inner: UnGraphMap::new(),
        }
    }

    /// Creates a graph with pre-allocated capacity for nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            inner: UnGraphMap::with_capacity(nodes, edges),
        }
    }

    /// Builds a graph from a weighted edge list.
    ///
    /// Duplicate edges follow last-write-wins; invalid edges (self-loops or
    /// non-positive weights) abort the build.
    pub fn from_edges<I>(edges: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (NodeId, NodeId, f64)>,
    {
        let mut graph = Self::new();
        for (u, v, w) in edges {
            graph.add_edge(u, v, w)?;
        }
        Ok(graph)
    }

    /// Adds a node to the graph. Idempotent.
    pub fn add_node(&mut self, node: NodeId) {
        self.inner.add_node(node);
    }

    /// Adds an edge between `u` and `v`, inserting missing endpoints.
    ///
    /// An existing edge has its weight overwritten. Self-loops and
    /// non-positive weights are rejected with [`Error::InvalidEdge`].
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, weight: f64) -> Result<(), Error> {
        if u == v {
            return Err(Error::invalid_edge(format!("self-loop on node {}", u)));
        }
        if !(weight > 0.0) {
            return Err(Error::invalid_edge(format!(
                "non-positive weight {} on edge {}-{}",
                weight, u, v
            )));
        }
        self.inner.add_edge(u, v, weight);
        Ok(())
    }

    /// Removes a node and all incident edges.
    pub fn remove_node(&mut self, node: NodeId) -> Result<(), Error> {
        if !self.inner.remove_node(node) {
            return Err(Error::no_such_node(format!("node {}", node)));
        }
        Ok(())
    }

    /// Returns true if the node exists in the graph.
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.inner.contains_node(node)
    }

    /// Returns true if the edge `u`-`v` exists.
    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.inner.contains_edge(u, v)
    }

    /// Returns the weight of the edge `u`-`v`, if present.
    pub fn edge_weight(&self, u: NodeId, v: NodeId) -> Option<f64> {
        self.inner.edge_weight(u, v).copied()
    }

    /// Returns an iterator over the neighbours of `node` in insertion order.
    ///
    /// Missing nodes yield an empty iterator.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.inner.neighbors(node)
    }

    /// Returns an iterator over the neighbours of `node` paired with edge
    /// weights, in insertion order.
    pub fn weighted_neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.inner.edges(node).map(|(_, v, w)| (v, *w))
    }

    /// Returns an iterator over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inner.nodes()
    }

    /// Returns an iterator over all edges as `(u, v, weight)` in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, f64)> + '_ {
        self.inner.all_edges().map(|(u, v, w)| (u, v, *w))
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Returns true if the graph contains no nodes.
    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Returns the unweighted degree of `node` (0 for missing nodes).
    pub fn degree(&self, node: NodeId) -> usize {
        self.inner.neighbors(node).count()
    }

    /// Returns the sum of incident edge weights of `node`.
    pub fn weighted_degree(&self, node: NodeId) -> f64 {
        self.inner.edges(node).map(|(_, _, w)| *w).sum()
    }

    /// Returns the sum of all edge weights (the `m` of modularity formulas).
    pub fn total_weight(&self) -> f64 {
        self.inner.all_edges().map(|(_, _, w)| *w).sum()
    }

    /// Returns the density `2|E| / (n(n-1))`, or 0.0 below two nodes.
    pub fn density(&self) -> f64 {
        let n = self.node_count();
        if n < 2 {
            return 0.0;
        }
        let m = self.edge_count() as f64;
        (2.0 * m) / (n * (n - 1)) as f64
    }

    /// Returns a fresh graph containing the given nodes and every edge with
    /// both endpoints among them. Insertion order follows the original graph.
    pub fn subgraph<F>(&self, mut keep: F) -> Graph
    where
        F: FnMut(NodeId) -> bool,
    {
        let mut sub = Graph::new();
        for node in self.nodes() {
            if keep(node) {
                sub.add_node(node);
            }
        }
        for (u, v, w) in self.edges() {
            if sub.contains_node(u) && sub.contains_node(v) {
                sub.inner.add_edge(u, v, w);
            }
        }
        sub
    }
}
