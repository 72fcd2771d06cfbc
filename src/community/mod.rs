pub mod louvain;
pub mod modularity;

use crate::core::types::NodeMap;

/// Result of a community-detection run.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityResult {
    /// Community id per node; ids are dense in `[0, num_communities)`,
    /// numbered in first-appearance order over the graph's insertion order.
    pub communities: NodeMap<usize>,
    /// Modularity of the partition, computed on the original graph.
    pub modularity: f64,
    pub num_communities: usize,
    /// Local-moving sweeps performed across all levels.
    pub iterations: usize,
}
