//! Modularity of a partition.

use std::collections::BTreeMap;

use crate::core::types::{Graph, NodeMap};

/// Modularity in the per-community form
/// `Q = Σ_c [Σ_in(c)/(2m) − γ·(Σ_tot(c)/(2m))²]`,
/// where `Σ_in` counts each internal edge from both endpoints and `Σ_tot` is
/// the sum of weighted degrees of the community's members.
///
/// An edgeless graph scores 0.
pub fn modularity(graph: &Graph, communities: &NodeMap<usize>, resolution: f64) -> f64 {
    let m = graph.total_weight();
    if m == 0.0 {
        return 0.0;
    }

    // Keyed by community id in order, so the summation order (and the exact
    // floating-point result) is stable across runs.
    let mut sigma_in: BTreeMap<usize, f64> = BTreeMap::new();
    let mut sigma_tot: BTreeMap<usize, f64> = BTreeMap::new();

    for (u, v, w) in graph.edges() {
        if communities[&u] == communities[&v] {
            *sigma_in.entry(communities[&u]).or_insert(0.0) += 2.0 * w;
        }
    }
    for node in graph.nodes() {
        *sigma_tot.entry(communities[&node]).or_insert(0.0) += graph.weighted_degree(node);
    }

    let two_m = 2.0 * m;
    sigma_tot
        .iter()
        .map(|(community, tot)| {
            let within = sigma_in.get(community).copied().unwrap_or(0.0);
            within / two_m - resolution * (tot / two_m) * (tot / two_m)
        })
        .sum()
}
