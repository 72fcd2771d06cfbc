//! Local clustering coefficients.

use crate::core::error::Error;
use crate::core::metrics::clustering_coefficient;
use crate::core::scheduler::TaskContext;
use crate::core::types::{Graph, NodeMap};

/// Per-node local clustering coefficient: the fraction of neighbour pairs
/// that are themselves adjacent. Nodes with degree below 2 score 0.
pub fn clustering_coefficients(graph: &Graph, ctx: &TaskContext) -> Result<NodeMap<f64>, Error> {
    let n = graph.node_count();
    let mut out = NodeMap::with_capacity(n);
    for (i, node) in graph.nodes().enumerate() {
        if i % 64 == 0 {
            ctx.checkpoint()?;
            ctx.progress(i as f64 / n.max(1) as f64);
        }
        out.insert(node, clustering_coefficient(graph, node));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::NodeId;

    fn edge(g: &mut Graph, a: u32, b: u32) {
        g.add_edge(NodeId::new(a), NodeId::new(b), 1.0).unwrap();
    }

    #[test]
    fn test_triangle_with_tail() {
        // 0-1-2 triangle plus pendant 3 on node 2.
        let mut g = Graph::new();
        edge(&mut g, 0, 1);
        edge(&mut g, 1, 2);
        edge(&mut g, 2, 0);
        edge(&mut g, 2, 3);
        let cc = clustering_coefficients(&g, &TaskContext::detached()).unwrap();
        assert!((cc[&NodeId::new(0)] - 1.0).abs() < 1e-12);
        assert!((cc[&NodeId::new(2)] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(cc[&NodeId::new(3)], 0.0);
    }

    #[test]
    fn test_path_is_all_zero() {
        let mut g = Graph::new();
        edge(&mut g, 0, 1);
        edge(&mut g, 1, 2);
        edge(&mut g, 2, 3);
        let cc = clustering_coefficients(&g, &TaskContext::detached()).unwrap();
        assert!(cc.values().all(|&v| v == 0.0));
    }

    #[test]
    fn test_values_in_unit_interval() {
        let mut g = Graph::new();
        for a in 0..6u32 {
            for b in (a + 1)..6 {
                if (a + b) % 2 == 0 {
                    edge(&mut g, a, b);
                }
            }
        }
        let cc = clustering_coefficients(&g, &TaskContext::detached()).unwrap();
        assert!(cc.values().all(|&v| (0.0..=1.0).contains(&v)));
    }
}
