/*!
# Dispatch Payload

Serializable graph representation handed to workers: a node list plus a
weighted edge list. Adjacency maps are never shipped; the worker reconstructs
its own index, which keeps the payload compact and format-stable across
worker implementations.
*/

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Graph, NodeId};

/// Minimal graph payload for transfer to a worker.
///
/// `nodes` preserves the graph's insertion order so the reconstructed graph
/// iterates identically to the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<(NodeId, NodeId, f64)>,
}

impl GraphPayload {
    /// Captures a graph into its dispatch form.
    pub fn from_graph(graph: &Graph) -> Self {
        GraphPayload {
            nodes: graph.nodes().collect(),
            edges: graph.edges().collect(),
        }
    }

    /// Reconstructs the graph, restoring node and edge insertion order.
    pub fn into_graph(&self) -> Result<Graph, Error> {
        let mut graph = Graph::with_capacity(self.nodes.len(), self.edges.len());
        for &node in &self.nodes {
            graph.add_node(node);
        }
        for &(u, v, w) in &self.edges {
            graph.add_edge(u, v, w)?;
        }
        Ok(graph)
    }

    /// Number of nodes in the payload; drives the inline-execution threshold.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut g = Graph::new();
        g.add_edge(NodeId::new(0), NodeId::new(1), 1.0).unwrap();
        g.add_edge(NodeId::new(1), NodeId::new(2), 2.0).unwrap();
        g.add_node(NodeId::new(7));

        let payload = GraphPayload::from_graph(&g);
        let restored = payload.into_graph().unwrap();

        assert_eq!(restored.node_count(), g.node_count());
        assert_eq!(restored.edge_count(), g.edge_count());
        assert_eq!(restored.edge_weight(NodeId::new(1), NodeId::new(2)), Some(2.0));
        assert!(restored.contains_node(NodeId::new(7)));

        let original_nodes: Vec<NodeId> = g.nodes().collect();
        let restored_nodes: Vec<NodeId> = restored.nodes().collect();
        assert_eq!(original_nodes, restored_nodes);
    }

    #[test]
    fn test_payload_is_json_stable() {
        let mut g = Graph::new();
        g.add_edge(NodeId::new(0), NodeId::new(1), 1.5).unwrap();
        let payload = GraphPayload::from_graph(&g);
        let json = serde_json::to_string(&payload).unwrap();
        let back: GraphPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }
}
