//! Degree centrality.

use crate::core::types::{Graph, NodeMap};

/// Unweighted incidence count per node. Deterministic.
pub fn degree_centrality(graph: &Graph) -> NodeMap<usize> {
    graph.nodes().map(|node| (node, graph.degree(node))).collect()
}
