//! Maximal-clique enumeration (Bron–Kerbosch with pivoting).

use std::collections::HashSet;

use crate::core::error::Error;
use crate::core::scheduler::TaskContext;
use crate::core::types::{Graph, NodeId, NodeMap};

/// Enumerates all maximal cliques as index lists over the insertion-order
/// node vector. Standard R/P/X recursion; the pivot is a vertex of `P ∪ X`
/// with the most neighbours inside `P`, which minimises branching.
fn bron_kerbosch(
    adj: &[HashSet<usize>],
    r: &mut Vec<usize>,
    p: Vec<usize>,
    x: Vec<usize>,
    cliques: &mut Vec<Vec<usize>>,
) {
    if p.is_empty() && x.is_empty() {
        cliques.push(r.clone());
        return;
    }

    let pivot = p
        .iter()
        .chain(x.iter())
        .copied()
        .max_by_key(|&u| adj[u].iter().filter(|v| p.contains(v)).count())
        .expect("P and X are not both empty here");

    let candidates: Vec<usize> = p.iter().copied().filter(|v| !adj[pivot].contains(v)).collect();

    let mut p = p;
    let mut x = x;
    for v in candidates {
        let next_p: Vec<usize> = p.iter().copied().filter(|u| adj[v].contains(u)).collect();
        let next_x: Vec<usize> = x.iter().copied().filter(|u| adj[v].contains(u)).collect();
        r.push(v);
        bron_kerbosch(adj, r, next_p, next_x, cliques);
        r.pop();
        p.retain(|&u| u != v);
        x.push(v);
    }
}

/// All maximal cliques of the graph, as node lists.
pub fn maximal_cliques(graph: &Graph, ctx: &TaskContext) -> Result<Vec<Vec<NodeId>>, Error> {
    let nodes: Vec<NodeId> = graph.nodes().collect();
    let n = nodes.len();
    let index: NodeMap<usize> = nodes.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    let adj: Vec<HashSet<usize>> = nodes
        .iter()
        .map(|&u| graph.neighbors(u).map(|v| index[&v]).collect())
        .collect();

    // Outer loop over top-level branches so cancellation lands between
    // subtrees rather than inside the recursion.
    let mut cliques: Vec<Vec<usize>> = Vec::new();
    let mut p: Vec<usize> = (0..n).collect();
    let mut x: Vec<usize> = Vec::new();
    let order: Vec<usize> = (0..n).collect();
    for (i, v) in order.into_iter().enumerate() {
        ctx.checkpoint()?;
        if !p.contains(&v) {
            continue;
        }
        let next_p: Vec<usize> = p.iter().copied().filter(|u| adj[v].contains(u)).collect();
        let next_x: Vec<usize> = x.iter().copied().filter(|u| adj[v].contains(u)).collect();
        let mut r = vec![v];
        bron_kerbosch(&adj, &mut r, next_p, next_x, &mut cliques);
        p.retain(|&u| u != v);
        x.push(v);
        ctx.progress((i + 1) as f64 / n.max(1) as f64);
    }

    Ok(cliques
        .into_iter()
        .map(|clique| clique.into_iter().map(|i| nodes[i]).collect())
        .collect())
}

/// Per-node count of maximal cliques containing the node. An isolated node
/// forms the singleton clique `{v}` and counts 1.
pub fn clique_membership(graph: &Graph, ctx: &TaskContext) -> Result<NodeMap<usize>, Error> {
    let mut counts: NodeMap<usize> = graph.nodes().map(|node| (node, 0)).collect();
    for clique in maximal_cliques(graph, ctx)? {
        for node in clique {
            *counts.get_mut(&node).expect("clique members are graph nodes") += 1;
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(g: &mut Graph, a: u32, b: u32) {
        g.add_edge(NodeId::new(a), NodeId::new(b), 1.0).unwrap();
    }

    #[test]
    fn test_triangle_single_clique() {
        let mut g = Graph::new();
        edge(&mut g, 0, 1);
        edge(&mut g, 1, 2);
        edge(&mut g, 2, 0);
        let cliques = maximal_cliques(&g, &TaskContext::detached()).unwrap();
        assert_eq!(cliques.len(), 1);
        assert_eq!(cliques[0].len(), 3);
        let counts = clique_membership(&g, &TaskContext::detached()).unwrap();
        assert!(counts.values().all(|&c| c == 1));
    }

    #[test]
    fn test_single_node_counts_one() {
        let mut g = Graph::new();
        g.add_node(NodeId::new(0));
        let counts = clique_membership(&g, &TaskContext::detached()).unwrap();
        assert_eq!(counts[&NodeId::new(0)], 1);
    }

    #[test]
    fn test_path_cliques_are_edges() {
        let mut g = Graph::new();
        edge(&mut g, 0, 1);
        edge(&mut g, 1, 2);
        edge(&mut g, 2, 3);
        let cliques = maximal_cliques(&g, &TaskContext::detached()).unwrap();
        assert_eq!(cliques.len(), 3);
        assert!(cliques.iter().all(|c| c.len() == 2));
        let counts = clique_membership(&g, &TaskContext::detached()).unwrap();
        assert_eq!(counts[&NodeId::new(1)], 2);
        assert_eq!(counts[&NodeId::new(0)], 1);
    }

    #[test]
    fn test_two_triangles_sharing_an_edge() {
        // 0-1-2 and 1-2-3: two maximal triangles, the shared edge nodes in both.
        let mut g = Graph::new();
        edge(&mut g, 0, 1);
        edge(&mut g, 1, 2);
        edge(&mut g, 2, 0);
        edge(&mut g, 1, 3);
        edge(&mut g, 2, 3);
        let counts = clique_membership(&g, &TaskContext::detached()).unwrap();
        assert_eq!(counts[&NodeId::new(0)], 1);
        assert_eq!(counts[&NodeId::new(1)], 2);
        assert_eq!(counts[&NodeId::new(2)], 2);
        assert_eq!(counts[&NodeId::new(3)], 1);
    }

    #[test]
    fn test_k4_is_one_clique() {
        let mut g = Graph::new();
        for a in 0..4u32 {
            for b in (a + 1)..4 {
                edge(&mut g, a, b);
            }
        }
        let cliques = maximal_cliques(&g, &TaskContext::detached()).unwrap();
        assert_eq!(cliques.len(), 1);
        assert_eq!(cliques[0].len(), 4);
    }
}
