//! Eigenvector centrality via power iteration.
//!
//! Computes the dominant eigenvector of the weighted adjacency matrix. On
//! disconnected graphs mass concentrates on the largest component and
//! isolated components decay toward zero.

use nalgebra::{DMatrix, DVector};

use crate::core::error::Error;
use crate::core::scheduler::TaskContext;
use crate::core::types::{Graph, NodeId, NodeMap};

/// Iterations between cancellation checks and progress reports.
const CHECK_STRIDE: usize = 256;

/// Eigenvector centrality.
///
/// Starts from the uniform vector `1/n`, iterates `x' = A·x` with L2
/// normalisation, and stops when the L1 change drops below `tolerance` or
/// after `max_iter` iterations. A zero L2 norm (edgeless graph) yields zero
/// for every node rather than an error.
pub fn eigenvector_centrality(
    graph: &Graph,
    max_iter: usize,
    tolerance: f64,
    ctx: &TaskContext,
) -> Result<NodeMap<f64>, Error> {
    let nodes: Vec<NodeId> = graph.nodes().collect();
    let n = nodes.len();
    if n == 0 {
        return Ok(NodeMap::new());
    }

    let index: NodeMap<usize> = nodes.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    let mut adj = DMatrix::<f64>::zeros(n, n);
    for (u, v, w) in graph.edges() {
        let ui = index[&u];
        let vi = index[&v];
        adj[(ui, vi)] = w;
        adj[(vi, ui)] = w;
    }

    let mut x = DVector::<f64>::from_element(n, 1.0 / n as f64);
    for iteration in 0..max_iter {
        if iteration % CHECK_STRIDE == 0 {
            ctx.checkpoint()?;
            ctx.progress(iteration as f64 / max_iter as f64);
        }

        let next = &adj * &x;
        let norm = next.norm();
        if norm == 0.0 {
            return Ok(nodes.into_iter().map(|node| (node, 0.0)).collect());
        }
        let next = next / norm;
        let change: f64 = next.iter().zip(x.iter()).map(|(a, b)| (a - b).abs()).sum();
        x = next;
        if change < tolerance {
            break;
        }
    }

    Ok(nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| (node, x[i]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(g: &mut Graph, a: u32, b: u32) {
        g.add_edge(NodeId::new(a), NodeId::new(b), 1.0).unwrap();
    }

    #[test]
    fn test_triangle_is_uniform() {
        let mut g = Graph::new();
        edge(&mut g, 0, 1);
        edge(&mut g, 1, 2);
        edge(&mut g, 2, 0);
        let ev = eigenvector_centrality(&g, 100_000, 1e-6, &TaskContext::detached()).unwrap();
        for node in g.nodes() {
            assert!((ev[&node] - 1.0 / 3f64.sqrt()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_l2_norm_is_one() {
        let mut g = Graph::new();
        edge(&mut g, 0, 1);
        edge(&mut g, 1, 2);
        edge(&mut g, 2, 3);
        let ev = eigenvector_centrality(&g, 100_000, 1e-6, &TaskContext::detached()).unwrap();
        let norm: f64 = ev.values().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_edgeless_graph_is_zero() {
        let mut g = Graph::new();
        g.add_node(NodeId::new(0));
        g.add_node(NodeId::new(1));
        let ev = eigenvector_centrality(&g, 1000, 1e-6, &TaskContext::detached()).unwrap();
        assert_eq!(ev[&NodeId::new(0)], 0.0);
        assert_eq!(ev[&NodeId::new(1)], 0.0);
    }

    #[test]
    fn test_hub_dominates_star() {
        let mut g = Graph::new();
        for leaf in 1..=5 {
            edge(&mut g, 0, leaf);
        }
        let ev = eigenvector_centrality(&g, 100_000, 1e-6, &TaskContext::detached()).unwrap();
        let hub = ev[&NodeId::new(0)];
        for leaf in 1..=5 {
            assert!(hub > ev[&NodeId::new(leaf)]);
        }
    }
}
