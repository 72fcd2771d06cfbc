/*!
# Compute Kernel

The tagged union of algorithm variants behind the single
`execute(algorithm, graph, context) → output` capability that every worker
runs. The scheduler dispatches these over serialized graph payloads; the
analysis facade maps external feature ids onto them through the registry.
*/

use crate::centrality::betweenness::betweenness_centrality;
use crate::centrality::cliques::clique_membership;
use crate::centrality::clustering::clustering_coefficients;
use crate::centrality::degree::degree_centrality;
use crate::centrality::eigenvector::eigenvector_centrality;
use crate::centrality::laplacian::laplacian_eigenvectors;
use crate::community::CommunityResult;
use crate::community::louvain::{LouvainOptions, louvain};
use crate::core::error::Error;
use crate::core::metrics::{GraphStatId, GraphStats, graph_stats};
use crate::core::scheduler::TaskContext;
use crate::core::types::{Graph, NodeMap};
use crate::layout::{LayoutId, LayoutOptions, LayoutResult, compute_layout};

/// One unit of schedulable work.
#[derive(Debug, Clone)]
pub enum Algorithm {
    Degree,
    Eigenvector { max_iter: usize, tol: f64 },
    Betweenness,
    Clustering,
    Cliques,
    Louvain(LouvainOptions),
    LaplacianEigenvectors,
    GraphStats(Vec<GraphStatId>),
    Layout { id: LayoutId, options: LayoutOptions },
}

impl Algorithm {
    /// Short label for logging and timing maps.
    pub fn label(&self) -> &'static str {
        match self {
            Algorithm::Degree => "degree",
            Algorithm::Eigenvector { .. } => "eigenvector",
            Algorithm::Betweenness => "betweenness",
            Algorithm::Clustering => "clustering",
            Algorithm::Cliques => "cliques",
            Algorithm::Louvain(_) => "modularity",
            Algorithm::LaplacianEigenvectors => "eigenvector-laplacian",
            Algorithm::GraphStats(_) => "graph-stats",
            Algorithm::Layout { id, .. } => id.as_str(),
        }
    }
}

/// Result payload of a completed task.
#[derive(Debug, Clone)]
pub enum TaskOutput {
    Scores(NodeMap<f64>),
    Counts(NodeMap<usize>),
    Pairs(NodeMap<(f64, f64)>),
    Community(CommunityResult),
    Layout(LayoutResult),
    Stats(GraphStats),
}

/// Runs one algorithm to completion on the worker's own graph copy.
pub fn execute(
    algorithm: &Algorithm,
    graph: &Graph,
    ctx: &TaskContext,
) -> Result<TaskOutput, Error> {
    match algorithm {
        Algorithm::Degree => Ok(TaskOutput::Counts(degree_centrality(graph))),
        Algorithm::Eigenvector { max_iter, tol } => Ok(TaskOutput::Scores(
            eigenvector_centrality(graph, *max_iter, *tol, ctx)?,
        )),
        Algorithm::Betweenness => Ok(TaskOutput::Scores(betweenness_centrality(graph, ctx)?)),
        Algorithm::Clustering => Ok(TaskOutput::Scores(clustering_coefficients(graph, ctx)?)),
        Algorithm::Cliques => Ok(TaskOutput::Counts(clique_membership(graph, ctx)?)),
        Algorithm::Louvain(options) => Ok(TaskOutput::Community(louvain(graph, options, ctx)?)),
        Algorithm::LaplacianEigenvectors => {
            Ok(TaskOutput::Pairs(laplacian_eigenvectors(graph, ctx)?))
        }
        Algorithm::GraphStats(requested) => {
            Ok(TaskOutput::Stats(graph_stats(graph, requested, ctx)?))
        }
        Algorithm::Layout { id, options } => {
            Ok(TaskOutput::Layout(compute_layout(graph, *id, options, ctx)?))
        }
    }
}
