/*!
# Graph-Level Statistics

Whole-graph metrics: density, diameter, average clustering, average shortest
path, connected components, and average degree. Diameter and average shortest
path are reported absent (not an error) when the graph is disconnected or has
no node pairs.
*/

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::scheduler::TaskContext;
use crate::core::types::{Graph, NodeId, NodeMap};

/// Identifiers for the graph-level statistics callers may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphStatId {
    Density,
    Diameter,
    AverageClustering,
    AverageShortestPath,
    ConnectedComponents,
    AverageDegree,
}

impl GraphStatId {
    /// All statistics, in registry listing order.
    pub const ALL: [GraphStatId; 6] = [
        GraphStatId::AverageClustering,
        GraphStatId::AverageDegree,
        GraphStatId::AverageShortestPath,
        GraphStatId::ConnectedComponents,
        GraphStatId::Density,
        GraphStatId::Diameter,
    ];

    /// Parses a statistic id, rejecting unknown names.
    pub fn parse(id: &str) -> Result<Self, Error> {
        match id {
            "density" => Ok(GraphStatId::Density),
            "diameter" => Ok(GraphStatId::Diameter),
            "average_clustering" => Ok(GraphStatId::AverageClustering),
            "average_shortest_path" => Ok(GraphStatId::AverageShortestPath),
            "connected_components" => Ok(GraphStatId::ConnectedComponents),
            "average_degree" => Ok(GraphStatId::AverageDegree),
            other => Err(Error::unknown_feature(other)),
        }
    }

    /// The external string id.
    pub fn as_str(self) -> &'static str {
        match self {
            GraphStatId::Density => "density",
            GraphStatId::Diameter => "diameter",
            GraphStatId::AverageClustering => "average_clustering",
            GraphStatId::AverageShortestPath => "average_shortest_path",
            GraphStatId::ConnectedComponents => "connected_components",
            GraphStatId::AverageDegree => "average_degree",
        }
    }
}

/// Whole-graph statistics record. Absent fields were either not requested or
/// are undefined for the graph (diameter and average shortest path on
/// disconnected graphs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diameter: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_clustering: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_shortest_path: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected_components: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_degree: Option<f64>,
}

/// BFS hop distances from `start` to every reachable node.
pub fn bfs_distances(graph: &Graph, start: NodeId) -> NodeMap<usize> {
    let mut distances = NodeMap::new();
    if !graph.contains_node(start) {
        return distances;
    }
    let mut queue = VecDeque::new();
    distances.insert(start, 0);
    queue.push_back(start);

    while let Some(node) = queue.pop_front() {
        let d = distances[&node];
        for neighbor in graph.neighbors(node) {
            if !distances.contains_key(&neighbor) {
                distances.insert(neighbor, d + 1);
                queue.push_back(neighbor);
            }
        }
    }
    distances
}

/// Number of connected components (BFS flood count).
pub fn connected_components(graph: &Graph) -> usize {
    let mut seen: NodeMap<()> = NodeMap::new();
    let mut components = 0;
    for start in graph.nodes() {
        if seen.contains_key(&start) {
            continue;
        }
        components += 1;
        let mut queue = VecDeque::new();
        seen.insert(start, ());
        queue.push_back(start);
        while let Some(node) = queue.pop_front() {
            for neighbor in graph.neighbors(node) {
                if seen.insert(neighbor, ()).is_none() {
                    queue.push_back(neighbor);
                }
            }
        }
    }
    components
}

/// Average degree `2|E| / n`, or `None` for the empty graph.
pub fn average_degree(graph: &Graph) -> Option<f64> {
    let n = graph.node_count();
    if n == 0 {
        return None;
    }
    Some(2.0 * graph.edge_count() as f64 / n as f64)
}

/// Local clustering coefficient of a single node: the density of the
/// subgraph induced by its neighbours. Nodes with degree below 2 score 0.
pub fn clustering_coefficient(graph: &Graph, node: NodeId) -> f64 {
    let neighbors: Vec<NodeId> = graph.neighbors(node).collect();
    let k = neighbors.len();
    if k < 2 {
        return 0.0;
    }

    let mut closed = 0;
    for i in 0..neighbors.len() {
        for j in (i + 1)..neighbors.len() {
            if graph.has_edge(neighbors[i], neighbors[j]) {
                closed += 1;
            }
        }
    }
    let pairs = k * (k - 1) / 2;
    closed as f64 / pairs as f64
}

/// Mean of the per-node clustering coefficients, 0.0 for the empty graph.
pub fn average_clustering(graph: &Graph) -> f64 {
    let n = graph.node_count();
    if n == 0 {
        return 0.0;
    }
    let total: f64 = graph
        .nodes()
        .map(|node| clustering_coefficient(graph, node))
        .sum();
    total / n as f64
}

/// Computes the requested statistics in one pass.
///
/// Diameter and average shortest path share a single all-sources BFS sweep;
/// the sweep checks cancellation and reports progress per source.
pub fn graph_stats(
    graph: &Graph,
    requested: &[GraphStatId],
    ctx: &TaskContext,
) -> Result<GraphStats, Error> {
    let mut stats = GraphStats::default();
    let n = graph.node_count();

    if requested.contains(&GraphStatId::Density) {
        stats.density = Some(graph.density());
    }
    if requested.contains(&GraphStatId::AverageDegree) {
        stats.average_degree = average_degree(graph);
    }
    if requested.contains(&GraphStatId::ConnectedComponents) {
        stats.connected_components = Some(connected_components(graph));
    }
    if requested.contains(&GraphStatId::AverageClustering) {
        stats.average_clustering = Some(average_clustering(graph));
    }

    let needs_sweep = requested.contains(&GraphStatId::Diameter)
        || requested.contains(&GraphStatId::AverageShortestPath);
    if needs_sweep && n > 0 {
        let mut max_distance = 0usize;
        let mut distance_sum = 0.0;
        let mut pair_count = 0usize;
        let mut connected = true;

        for (i, source) in graph.nodes().enumerate() {
            ctx.checkpoint()?;
            let distances = bfs_distances(graph, source);
            if distances.len() != n {
                connected = false;
                break;
            }
            for (&target, &d) in &distances {
                if target == source {
                    continue;
                }
                max_distance = max_distance.max(d);
                distance_sum += d as f64;
                pair_count += 1;
            }
            ctx.progress((i + 1) as f64 / n as f64);
        }

        if connected {
            if requested.contains(&GraphStatId::Diameter) {
                stats.diameter = Some(max_distance);
            }
            if requested.contains(&GraphStatId::AverageShortestPath) && pair_count > 0 {
                stats.average_shortest_path = Some(distance_sum / pair_count as f64);
            }
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(g: &mut Graph, a: u32, b: u32) {
        g.add_edge(NodeId::new(a), NodeId::new(b), 1.0).unwrap();
    }

    #[test]
    fn test_stat_ids_round_trip() {
        for stat in GraphStatId::ALL {
            assert_eq!(GraphStatId::parse(stat.as_str()).unwrap(), stat);
        }
        assert!(GraphStatId::parse("radius").is_err());
    }

    #[test]
    fn test_bfs_distances_path() {
        let mut g = Graph::new();
        edge(&mut g, 0, 1);
        edge(&mut g, 1, 2);
        edge(&mut g, 2, 3);
        let d = bfs_distances(&g, NodeId::new(0));
        assert_eq!(d[&NodeId::new(3)], 3);
        assert_eq!(d.len(), 4);
    }

    #[test]
    fn test_connected_components() {
        let mut g = Graph::new();
        edge(&mut g, 0, 1);
        edge(&mut g, 2, 3);
        assert_eq!(connected_components(&g), 2);
        assert_eq!(connected_components(&Graph::new()), 0);
    }

    #[test]
    fn test_clustering_triangle() {
        let mut g = Graph::new();
        edge(&mut g, 0, 1);
        edge(&mut g, 1, 2);
        edge(&mut g, 2, 0);
        for node in g.nodes() {
            assert!((clustering_coefficient(&g, node) - 1.0).abs() < 1e-12);
        }
        assert!((average_clustering(&g) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_graph_stats_connected_path() {
        let mut g = Graph::new();
        edge(&mut g, 0, 1);
        edge(&mut g, 1, 2);
        edge(&mut g, 2, 3);
        let stats = graph_stats(&g, &GraphStatId::ALL, &TaskContext::detached()).unwrap();
        assert_eq!(stats.diameter, Some(3));
        assert_eq!(stats.connected_components, Some(1));
        // Path A-B-C-D: distances 1,2,3,1,2,1 over 6 pairs.
        assert!((stats.average_shortest_path.unwrap() - 10.0 / 6.0).abs() < 1e-12);
        assert!((stats.average_degree.unwrap() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_graph_stats_disconnected() {
        let mut g = Graph::new();
        edge(&mut g, 0, 1);
        edge(&mut g, 2, 3);
        let stats = graph_stats(&g, &GraphStatId::ALL, &TaskContext::detached()).unwrap();
        assert_eq!(stats.diameter, None);
        assert_eq!(stats.average_shortest_path, None);
        assert_eq!(stats.connected_components, Some(2));
    }

    #[test]
    fn test_graph_stats_empty() {
        let stats = graph_stats(&Graph::new(), &GraphStatId::ALL, &TaskContext::detached()).unwrap();
        assert_eq!(stats.diameter, None);
        assert_eq!(stats.average_shortest_path, None);
        assert_eq!(stats.average_degree, None);
        assert_eq!(stats.connected_components, Some(0));
    }
}
