//! Betweenness centrality (Brandes).
//!
//! Single-source shortest-path accumulation over all sources: BFS when every
//! edge weight is 1, Dijkstra with a binary heap otherwise. Sources fan out
//! over rayon in fixed-size batches whose results are merged in source order,
//! so the output is identical to the sequential sweep.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::core::error::Error;
use crate::core::scheduler::TaskContext;
use crate::core::types::{Graph, NodeId, NodeMap};

/// Sources per rayon batch; cancellation is checked between batches and at
/// the start of every source.
const BATCH: usize = 64;

/// Tolerance for comparing accumulated path lengths in the weighted case.
const DIST_EPS: f64 = 1e-12;

/// Betweenness centrality, normalised by `2 / ((n-1)(n-2))`.
///
/// Graphs with fewer than three nodes score zero everywhere.
pub fn betweenness_centrality(graph: &Graph, ctx: &TaskContext) -> Result<NodeMap<f64>, Error> {
    let nodes: Vec<NodeId> = graph.nodes().collect();
    let n = nodes.len();
    if n < 3 {
        return Ok(nodes.into_iter().map(|node| (node, 0.0)).collect());
    }

    let index: NodeMap<usize> = nodes.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    let mut adj: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    for (i, &node) in nodes.iter().enumerate() {
        adj[i] = graph
            .weighted_neighbors(node)
            .map(|(v, w)| (index[&v], w))
            .collect();
    }
    let weighted = graph.edges().any(|(_, _, w)| w != 1.0);

    let mut central = vec![0.0; n];
    let sources: Vec<usize> = (0..n).collect();
    let mut processed = 0usize;
    for chunk in sources.chunks(BATCH) {
        ctx.checkpoint()?;
        let deltas: Vec<Result<Vec<f64>, Error>> = chunk
            .par_iter()
            .map(|&s| {
                ctx.checkpoint()?;
                Ok(if weighted {
                    single_source_dijkstra(&adj, s)
                } else {
                    single_source_bfs(&adj, s)
                })
            })
            .collect();
        for delta in deltas {
            let delta = delta?;
            for (acc, d) in central.iter_mut().zip(delta) {
                *acc += d;
            }
        }
        processed += chunk.len();
        ctx.progress(processed as f64 / n as f64);
    }

    // Every unordered pair is accumulated once per direction, so the
    // undirected 2/((n-1)(n-2)) factor reduces to 1/((n-1)(n-2)).
    let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
    Ok(nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| (node, central[i] * scale))
        .collect())
}

/// Dependency accumulation for one source on a unit-weight graph.
fn single_source_bfs(adj: &[Vec<(usize, f64)>], s: usize) -> Vec<f64> {
    let n = adj.len();
    let mut dist = vec![-1i64; n];
    let mut sigma = vec![0.0; n];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut order = Vec::with_capacity(n);

    dist[s] = 0;
    sigma[s] = 1.0;
    let mut queue = VecDeque::new();
    queue.push_back(s);
    while let Some(v) = queue.pop_front() {
        order.push(v);
        for &(w, _) in &adj[v] {
            if dist[w] < 0 {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
            if dist[w] == dist[v] + 1 {
                sigma[w] += sigma[v];
                preds[w].push(v);
            }
        }
    }

    accumulate(&order, &preds, &sigma, s, n)
}

/// Dependency accumulation for one source with real-valued weights.
fn single_source_dijkstra(adj: &[Vec<(usize, f64)>], s: usize) -> Vec<f64> {
    let n = adj.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut sigma = vec![0.0; n];
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut settled = vec![false; n];
    let mut order = Vec::with_capacity(n);

    dist[s] = 0.0;
    sigma[s] = 1.0;
    let mut heap = BinaryHeap::new();
    heap.push(Reverse((OrderedFloat(0.0), s)));
    while let Some(Reverse((OrderedFloat(d), v))) = heap.pop() {
        if settled[v] {
            continue;
        }
        settled[v] = true;
        order.push(v);
        for &(w, weight) in &adj[v] {
            let candidate = d + weight;
            if candidate < dist[w] - DIST_EPS {
                dist[w] = candidate;
                sigma[w] = sigma[v];
                preds[w].clear();
                preds[w].push(v);
                heap.push(Reverse((OrderedFloat(candidate), w)));
            } else if (candidate - dist[w]).abs() <= DIST_EPS && !settled[w] {
                sigma[w] += sigma[v];
                preds[w].push(v);
            }
        }
    }

    accumulate(&order, &preds, &sigma, s, n)
}

fn accumulate(order: &[usize], preds: &[Vec<usize>], sigma: &[f64], s: usize, n: usize) -> Vec<f64> {
    let mut delta = vec![0.0; n];
    for &w in order.iter().rev() {
        for &v in &preds[w] {
            delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
        }
    }
    delta[s] = 0.0;
    delta
}
