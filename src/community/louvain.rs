//! Louvain method for community detection.
//!
//! Two alternating phases repeated until no further improvement: local moving
//! (each node greedily joins the neighbouring community with the best
//! modularity gain) and contraction (each community becomes a super-node;
//! intra-community weight becomes a self-loop on the super-node). The public
//! graph model forbids self-loops, so only this internal contracted
//! representation carries them.
//!
//! Given the same graph, resolution, and seed, the partition is bit-identical
//! across runs.

use std::collections::HashMap;

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::community::CommunityResult;
use crate::community::modularity::modularity;
use crate::core::error::Error;
use crate::core::scheduler::TaskContext;
use crate::core::types::{Graph, NodeId, NodeMap};

/// Minimum global modularity gain between successive sweeps.
const MIN_GAIN: f64 = 1e-7;

/// Tuning knobs of the Louvain run.
#[derive(Debug, Clone)]
pub struct LouvainOptions {
    /// Resolution γ; larger values favour more, smaller communities.
    pub resolution: f64,
    /// When set, node visit order is shuffled reproducibly; otherwise nodes
    /// are visited in insertion order.
    pub seed: Option<u64>,
    /// Cap on local-moving sweeps across all levels.
    pub max_sweeps: usize,
}

impl Default for LouvainOptions {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            seed: None,
            max_sweeps: 100,
        }
    }
}

/// Contracted working graph. Neighbour lists exclude self-loops, which are
/// tracked per node; `m` is invariant across levels.
struct WorkingGraph {
    neighbors: Vec<Vec<(usize, f64)>>,
    self_loops: Vec<f64>,
}

impl WorkingGraph {
    fn from_graph(graph: &Graph, index: &NodeMap<usize>) -> Self {
        let n = graph.node_count();
        let mut neighbors = vec![Vec::new(); n];
        for (i, node) in graph.nodes().enumerate() {
            neighbors[i] = graph
                .weighted_neighbors(node)
                .map(|(v, w)| (index[&v], w))
                .collect();
        }
        Self {
            neighbors,
            self_loops: vec![0.0; n],
        }
    }

    fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// Weighted degree including both endpoints of the self-loop.
    fn weighted_degree(&self, u: usize) -> f64 {
        let adjacent: f64 = self.neighbors[u].iter().map(|&(_, w)| w).sum();
        adjacent + 2.0 * self.self_loops[u]
    }

    /// Collapses communities into super-nodes. Inter-community weights sum;
    /// intra-community weights accumulate on the super-node's self-loop.
    fn contract(&self, community: &[usize], num_communities: usize) -> WorkingGraph {
        let mut self_loops = vec![0.0; num_communities];
        let mut merged: Vec<HashMap<usize, f64>> = vec![HashMap::new(); num_communities];

        for u in 0..self.len() {
            let cu = community[u];
            self_loops[cu] += self.self_loops[u];
            for &(v, w) in &self.neighbors[u] {
                let cv = community[v];
                if cu == cv {
                    // Each undirected edge appears in both endpoint lists.
                    if u < v {
                        self_loops[cu] += w;
                    }
                } else {
                    *merged[cu].entry(cv).or_insert(0.0) += w;
                }
            }
        }

        let neighbors = merged
            .into_iter()
            .map(|adjacency| {
                let mut list: Vec<(usize, f64)> = adjacency.into_iter().collect();
                list.sort_by_key(|&(v, _)| v);
                list
            })
            .collect();
        WorkingGraph {
            neighbors,
            self_loops,
        }
    }
}

/// Per-community Σ_tot / Σ_in caches, kept coherent by every remove/insert.
struct Partition {
    community: Vec<usize>,
    sigma_tot: Vec<f64>,
    sigma_in: Vec<f64>,
}

impl Partition {
    fn singletons(graph: &WorkingGraph) -> Self {
        let n = graph.len();
        let community: Vec<usize> = (0..n).collect();
        let sigma_tot: Vec<f64> = (0..n).map(|u| graph.weighted_degree(u)).collect();
        let sigma_in: Vec<f64> = (0..n).map(|u| 2.0 * graph.self_loops[u]).collect();
        Self {
            community,
            sigma_tot,
            sigma_in,
        }
    }

    fn remove(&mut self, u: usize, k_u: f64, k_u_to_own: f64, self_loop: f64) {
        let c = self.community[u];
        self.sigma_tot[c] -= k_u;
        self.sigma_in[c] -= 2.0 * k_u_to_own + 2.0 * self_loop;
    }

    fn insert(&mut self, u: usize, c: usize, k_u: f64, k_u_to_c: f64, self_loop: f64) {
        self.community[u] = c;
        self.sigma_tot[c] += k_u;
        self.sigma_in[c] += 2.0 * k_u_to_c + 2.0 * self_loop;
    }

    fn quality(&self, m: f64, resolution: f64) -> f64 {
        let two_m = 2.0 * m;
        self.sigma_tot
            .iter()
            .zip(&self.sigma_in)
            .map(|(&tot, &within)| within / two_m - resolution * (tot / two_m) * (tot / two_m))
            .sum()
    }
}

/// One level of local moving. Returns the dense community assignment, the
/// number of communities, and the sweeps spent.
fn local_moving(
    graph: &WorkingGraph,
    m: f64,
    options: &LouvainOptions,
    rng: &mut Option<StdRng>,
    sweeps_left: usize,
    ctx: &TaskContext,
) -> Result<(Vec<usize>, usize, usize, bool), Error> {
    let n = graph.len();
    let mut partition = Partition::singletons(graph);
    let degrees: Vec<f64> = (0..n).map(|u| graph.weighted_degree(u)).collect();

    let mut sweeps = 0;
    let mut improved_level = false;
    let mut quality = partition.quality(m, options.resolution);

    while sweeps < sweeps_left {
        ctx.checkpoint()?;
        sweeps += 1;
        let mut moved = 0usize;

        let mut order: Vec<usize> = (0..n).collect();
        if let Some(rng) = rng {
            order.shuffle(rng);
        }

        for &u in &order {
            let c_old = partition.community[u];
            let k_u = degrees[u];

            // Weight from u into each neighbouring community.
            let mut k_u_to: HashMap<usize, f64> = HashMap::new();
            for &(v, w) in &graph.neighbors[u] {
                *k_u_to.entry(partition.community[v]).or_insert(0.0) += w;
            }
            let k_u_to_old = k_u_to.get(&c_old).copied().unwrap_or(0.0);

            partition.remove(u, k_u, k_u_to_old, graph.self_loops[u]);

            // Candidates in ascending community id so equal gains resolve to
            // the lower id; strict comparison keeps the first winner.
            let mut candidates: Vec<usize> = k_u_to.keys().copied().collect();
            candidates.sort_unstable();

            let gain = |c: usize| {
                let into = k_u_to.get(&c).copied().unwrap_or(0.0);
                into / m - options.resolution * partition.sigma_tot[c] * k_u / (2.0 * m * m)
            };

            let mut best_comm = c_old;
            let mut best_gain = gain(c_old);
            for c in candidates {
                if c == c_old {
                    continue;
                }
                let g = gain(c);
                if g > best_gain {
                    best_gain = g;
                    best_comm = c;
                }
            }

            let k_u_to_best = k_u_to.get(&best_comm).copied().unwrap_or(0.0);
            partition.insert(u, best_comm, k_u, k_u_to_best, graph.self_loops[u]);
            if best_comm != c_old {
                moved += 1;
            }
        }

        ctx.progress(sweeps as f64 / options.max_sweeps as f64);
        let next_quality = partition.quality(m, options.resolution);
        let gained = next_quality - quality;
        quality = next_quality;
        if moved > 0 {
            improved_level = true;
        }
        if moved == 0 || gained < MIN_GAIN {
            break;
        }
    }

    // Renumber communities densely in first-appearance order.
    let mut renumber: HashMap<usize, usize> = HashMap::new();
    let mut dense = vec![0usize; n];
    for u in 0..n {
        let next = renumber.len();
        let id = *renumber.entry(partition.community[u]).or_insert(next);
        dense[u] = id;
    }
    Ok((dense, renumber.len(), sweeps, improved_level))
}

/// Runs the Louvain method.
///
/// Terminates when a sweep produces zero moves, when the global modularity
/// gain drops below `1e-7`, or when the sweep cap is reached. The reported
/// modularity is evaluated on the original graph with the unpacked partition.
pub fn louvain(
    graph: &Graph,
    options: &LouvainOptions,
    ctx: &TaskContext,
) -> Result<CommunityResult, Error> {
    let nodes: Vec<NodeId> = graph.nodes().collect();
    let n = nodes.len();
    if n == 0 {
        return Ok(CommunityResult {
            communities: NodeMap::new(),
            modularity: 0.0,
            num_communities: 0,
            iterations: 0,
        });
    }

    let m = graph.total_weight();
    if m == 0.0 {
        // Edgeless graph: every node is its own community.
        let communities: NodeMap<usize> = nodes.iter().enumerate().map(|(i, &v)| (v, i)).collect();
        return Ok(CommunityResult {
            communities,
            num_communities: n,
            modularity: 0.0,
            iterations: 0,
        });
    }

    let index: NodeMap<usize> = nodes.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    let mut working = WorkingGraph::from_graph(graph, &index);
    let mut rng = options.seed.map(StdRng::seed_from_u64);

    // membership[i] = community of original node i in the current level.
    let mut membership: Vec<usize> = (0..n).collect();
    let mut total_sweeps = 0usize;

    loop {
        let sweeps_left = options.max_sweeps.saturating_sub(total_sweeps);
        if sweeps_left == 0 {
            break;
        }
        let (assignment, communities, sweeps, improved) =
            local_moving(&working, m, options, &mut rng, sweeps_left, ctx)?;
        total_sweeps += sweeps;

        if !improved {
            break;
        }
        for slot in membership.iter_mut() {
            *slot = assignment[*slot];
        }
        if communities == working.len() {
            break;
        }
        working = working.contract(&assignment, communities);
    }

    // Final dense renumbering in first-appearance order over the original
    // node insertion order.
    let mut renumber: HashMap<usize, usize> = HashMap::new();
    let mut communities = NodeMap::with_capacity(n);
    for (i, &node) in nodes.iter().enumerate() {
        let next = renumber.len();
        let id = *renumber.entry(membership[i]).or_insert(next);
        communities.insert(node, id);
    }
    let num_communities = renumber.len();
    let quality = modularity(graph, &communities, options.resolution);

    Ok(CommunityResult {
        communities,
        modularity: quality,
        num_communities,
        iterations: total_sweeps,
    })
}
