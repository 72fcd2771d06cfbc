/*!
# Analysis Facade

The single public entry point for external callers: [`analyze`] converts an
edge list into the graph model, runs the selected features through the
scheduler, and assembles per-node records plus graph-level statistics.
[`layout`] is the sibling entry point for the layout family, enforcing each
layout's preconditions (including the transparent Laplacian eigenvector
precompute for the spectral layout).

Caller errors (invalid edges, unknown ids, oversized graphs) are reported
synchronously before any scheduling work. Runtime errors of a single feature
do not abort the others unless `strict` is set; they surface in the result's
`errors` map instead.
*/

pub mod registry;

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};
use tracing::debug;

use crate::analysis::registry::Feature;
use crate::community::louvain::LouvainOptions;
use crate::core::error::{Error, ErrorReport};
use crate::core::kernel::{Algorithm, TaskOutput};
use crate::core::metrics::{GraphStatId, GraphStats};
use crate::core::scheduler::{Scheduler, SchedulerConfig, TaskHandle};
use crate::core::serialization::GraphPayload;
use crate::core::types::{Graph, NodeId};
use crate::layout::{LayoutId, LayoutOptions};

/// Node count ceiling for the dense Laplacian eigendecomposition backing the
/// spectral layout and the `eigenvector-laplacian` feature.
pub const SPECTRAL_CEILING: usize = 2000;

/// External node identifier: string or integer. Identifiers are coerced to
/// their string form for internal storage (`1` and `"1"` name the same
/// node); the originally supplied form is echoed back in results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NodeKey::Int(i) => write!(f, "{}", i),
            NodeKey::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for NodeKey {
    fn from(value: i64) -> Self {
        NodeKey::Int(value)
    }
}

impl From<&str> for NodeKey {
    fn from(value: &str) -> Self {
        NodeKey::Str(value.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(value: String) -> Self {
        NodeKey::Str(value)
    }
}

fn default_weight() -> f64 {
    1.0
}

/// One edge record from an adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeInput {
    pub source: NodeKey,
    pub target: NodeKey,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl EdgeInput {
    pub fn new(source: impl Into<NodeKey>, target: impl Into<NodeKey>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight: 1.0,
        }
    }

    pub fn weighted(source: impl Into<NodeKey>, target: impl Into<NodeKey>, weight: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            weight,
        }
    }
}

/// Optional explicit node record: supplies isolated nodes and carries
/// arbitrary attributes through the core untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInput {
    pub id: NodeKey,
    #[serde(flatten)]
    pub attributes: JsonMap<String, Value>,
}

impl NodeInput {
    pub fn new(id: impl Into<NodeKey>) -> Self {
        Self {
            id: id.into(),
            attributes: JsonMap::new(),
        }
    }
}

/// Per-node result record. Absent fields were not requested, which is
/// distinct from zero. Input attributes are reattached untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStats {
    pub id: NodeKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eigenvector: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub betweenness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clustering: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cliques: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub laplacian_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub laplacian_y: Option<f64>,
    #[serde(flatten, skip_serializing_if = "JsonMap::is_empty")]
    pub attributes: JsonMap<String, Value>,
}

impl NodeStats {
    fn new(id: NodeKey) -> Self {
        Self {
            id,
            degree: None,
            eigenvector: None,
            betweenness: None,
            clustering: None,
            cliques: None,
            community: None,
            laplacian_x: None,
            laplacian_y: None,
            attributes: JsonMap::new(),
        }
    }
}

/// Result of an [`analyze`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub nodes: Vec<NodeStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphStats>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, ErrorReport>,
    /// Wall-clock milliseconds per feature, measured from submission.
    pub timings: BTreeMap<String, u64>,
}

/// Analysis options. `max_iter` caps the eigenvector power iteration
/// (default 100 000) and the Louvain sweeps (default 100).
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub max_iter: Option<usize>,
    pub tol: f64,
    pub resolution: f64,
    pub seed: Option<u64>,
    /// Abort the whole analysis on the first feature error.
    pub strict: bool,
    /// Per-feature deadline in milliseconds; `None` disables it.
    pub timeout_ms: Option<u64>,
    /// Node count below which execution stays inline on the caller's thread.
    pub small_threshold: usize,
    pub max_workers: Option<usize>,
    /// Graph-level statistics to compute, requested separately from the
    /// per-node features.
    pub graph_stats: Vec<GraphStatId>,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            max_iter: None,
            tol: 1e-6,
            resolution: 1.0,
            seed: None,
            strict: false,
            timeout_ms: Some(60_000),
            small_threshold: 500,
            max_workers: None,
            graph_stats: Vec::new(),
        }
    }
}

/// A 2-D position in an external layout result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// First-appearance interner: canonical string form to dense node id plus
/// the originally supplied key for echoing back.
#[derive(Debug)]
struct Interner {
    entries: IndexMap<String, (NodeId, NodeKey)>,
}

impl Interner {
    fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    fn intern(&mut self, key: &NodeKey) -> NodeId {
        let canonical = key.to_string();
        if let Some(&(id, _)) = self.entries.get(&canonical) {
            return id;
        }
        let id = NodeId::new(self.entries.len() as u32);
        self.entries.insert(canonical, (id, key.clone()));
        id
    }

    fn get(&self, key: &NodeKey) -> Option<NodeId> {
        self.entries.get(&key.to_string()).map(|&(id, _)| id)
    }

    fn iter(&self) -> impl Iterator<Item = (&str, NodeId, &NodeKey)> + '_ {
        self.entries
            .iter()
            .map(|(canonical, (id, key))| (canonical.as_str(), *id, key))
    }
}

/// Normalises and validates the external edge and node lists into the graph
/// model. Canonical node order is first-appearance order across the edge
/// list, with explicit nodes appended after.
fn build_graph(edges: &[EdgeInput], nodes: &[NodeInput]) -> Result<(Graph, Interner), Error> {
    let mut interner = Interner::new();
    let mut graph = Graph::new();
    for edge in edges {
        if !(edge.weight > 0.0) {
            return Err(Error::invalid_edge(format!(
                "non-positive weight {} on edge {}-{}",
                edge.weight, edge.source, edge.target
            )));
        }
        let u = interner.intern(&edge.source);
        let v = interner.intern(&edge.target);
        if u == v {
            return Err(Error::invalid_edge(format!("self-loop on node {}", edge.source)));
        }
        graph.add_edge(u, v, edge.weight)?;
    }
    for node in nodes {
        let id = interner.intern(&node.id);
        graph.add_node(id);
    }
    Ok((graph, interner))
}

fn scheduler_for(opts: &AnalysisOptions) -> Scheduler {
    Scheduler::new(SchedulerConfig {
        max_workers: opts.max_workers,
        small_threshold: opts.small_threshold,
        default_timeout: opts.timeout_ms.map(Duration::from_millis),
        ..SchedulerConfig::default()
    })
}

fn feature_algorithm(feature: Feature, opts: &AnalysisOptions) -> Algorithm {
    match feature {
        Feature::Degree => Algorithm::Degree,
        Feature::Eigenvector => Algorithm::Eigenvector {
            max_iter: opts.max_iter.unwrap_or(100_000),
            tol: opts.tol,
        },
        Feature::Betweenness => Algorithm::Betweenness,
        Feature::Clustering => Algorithm::Clustering,
        Feature::Cliques => Algorithm::Cliques,
        Feature::Modularity => Algorithm::Louvain(LouvainOptions {
            resolution: opts.resolution,
            seed: opts.seed,
            max_sweeps: opts.max_iter.unwrap_or(100),
        }),
        Feature::EigenvectorLaplacian => Algorithm::LaplacianEigenvectors,
    }
}

enum Submitted {
    Feature(Feature),
    Stats,
}

impl Submitted {
    fn label(&self) -> &'static str {
        match self {
            Submitted::Feature(feature) => feature.as_str(),
            Submitted::Stats => "graph-stats",
        }
    }
}

fn apply_output(
    stats: &mut [NodeStats],
    graph_result: &mut Option<GraphStats>,
    submitted: &Submitted,
    output: TaskOutput,
) {
    match (submitted, output) {
        (Submitted::Feature(Feature::Degree), TaskOutput::Counts(map)) => {
            for (node, value) in map {
                stats[node.index()].degree = Some(value);
            }
        }
        (Submitted::Feature(Feature::Cliques), TaskOutput::Counts(map)) => {
            for (node, value) in map {
                stats[node.index()].cliques = Some(value);
            }
        }
        (Submitted::Feature(Feature::Eigenvector), TaskOutput::Scores(map)) => {
            for (node, value) in map {
                stats[node.index()].eigenvector = Some(value);
            }
        }
        (Submitted::Feature(Feature::Betweenness), TaskOutput::Scores(map)) => {
            for (node, value) in map {
                stats[node.index()].betweenness = Some(value);
            }
        }
        (Submitted::Feature(Feature::Clustering), TaskOutput::Scores(map)) => {
            for (node, value) in map {
                stats[node.index()].clustering = Some(value);
            }
        }
        (Submitted::Feature(Feature::Modularity), TaskOutput::Community(result)) => {
            for (node, community) in result.communities {
                stats[node.index()].community = Some(community);
            }
        }
        (Submitted::Feature(Feature::EigenvectorLaplacian), TaskOutput::Pairs(map)) => {
            for (node, (x, y)) in map {
                stats[node.index()].laplacian_x = Some(x);
                stats[node.index()].laplacian_y = Some(y);
            }
        }
        (Submitted::Stats, TaskOutput::Stats(computed)) => {
            *graph_result = Some(computed);
        }
        (submitted, output) => {
            debug_assert!(false, "mismatched output {:?} for {}", output, submitted.label());
        }
    }
}

/// Runs the selected features over the edge list and returns per-node
/// records, optional graph-level statistics, per-feature errors, and
/// timings.
///
/// # Examples
///
/// ```rust
/// use netrics::analysis::{AnalysisOptions, EdgeInput, analyze};
///
/// let edges = vec![
///     EdgeInput::new("a", "b"),
///     EdgeInput::new("b", "c"),
///     EdgeInput::new("c", "a"),
/// ];
/// let result = analyze(&edges, &[], &["degree", "clustering"], &AnalysisOptions::default())
///     .unwrap();
/// assert_eq!(result.nodes.len(), 3);
/// assert_eq!(result.nodes[0].degree, Some(2));
/// ```
pub fn analyze(
    edges: &[EdgeInput],
    nodes: &[NodeInput],
    features: &[&str],
    opts: &AnalysisOptions,
) -> Result<AnalysisResult, Error> {
    let (graph, interner) = build_graph(edges, nodes)?;

    // Validate against the registry, deduplicating while preserving order.
    let mut selected: Vec<Feature> = Vec::new();
    for id in features {
        let feature = Feature::parse(id)?;
        if !selected.contains(&feature) {
            selected.push(feature);
        }
    }

    if selected.contains(&Feature::EigenvectorLaplacian) && graph.node_count() > SPECTRAL_CEILING {
        return Err(Error::GraphTooLarge {
            nodes: graph.node_count(),
            limit: SPECTRAL_CEILING,
        });
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        features = selected.len(),
        "analysis started"
    );

    let scheduler = scheduler_for(opts);
    let payload = GraphPayload::from_graph(&graph);

    let mut queue: VecDeque<(Submitted, Instant, TaskHandle)> = VecDeque::new();
    for &feature in &selected {
        let handle = scheduler.submit(feature_algorithm(feature, opts), payload.clone())?;
        queue.push_back((Submitted::Feature(feature), Instant::now(), handle));
    }
    if !opts.graph_stats.is_empty() {
        let handle = scheduler.submit(Algorithm::GraphStats(opts.graph_stats.clone()), payload)?;
        queue.push_back((Submitted::Stats, Instant::now(), handle));
    }

    let mut node_stats: Vec<NodeStats> = interner
        .iter()
        .map(|(_, _, key)| NodeStats::new(key.clone()))
        .collect();
    for node in nodes {
        if let Some(id) = interner.get(&node.id) {
            node_stats[id.index()].attributes = node.attributes.clone();
        }
    }

    let mut graph_result: Option<GraphStats> = None;
    let mut errors: BTreeMap<String, ErrorReport> = BTreeMap::new();
    let mut timings: BTreeMap<String, u64> = BTreeMap::new();

    while let Some((submitted, started, handle)) = queue.pop_front() {
        let label = submitted.label().to_string();
        match handle.join() {
            Ok(output) => {
                timings.insert(label, started.elapsed().as_millis() as u64);
                apply_output(&mut node_stats, &mut graph_result, &submitted, output);
            }
            Err(err) => {
                if opts.strict {
                    for (_, _, pending) in &queue {
                        pending.cancel();
                    }
                    return Err(err);
                }
                timings.insert(label.clone(), started.elapsed().as_millis() as u64);
                errors.insert(label, ErrorReport::from(&err));
            }
        }
    }

    Ok(AnalysisResult {
        nodes: node_stats,
        graph: graph_result,
        errors,
        timings,
    })
}

/// Computes one layout over the edge list, keyed by the external node id in
/// first-appearance order.
///
/// Preconditions are enforced here: the spectral layout's Laplacian
/// eigenvectors are computed transparently when not supplied (subject to the
/// dense-solver ceiling), and a non-bipartite graph fails the bipartite
/// layout before any scheduling work.
pub fn layout(
    edges: &[EdgeInput],
    nodes: &[NodeInput],
    layout_id: &str,
    layout_options: LayoutOptions,
    opts: &AnalysisOptions,
) -> Result<IndexMap<String, Position>, Error> {
    let (graph, interner) = build_graph(edges, nodes)?;
    let id = LayoutId::parse(layout_id)?;

    let mut layout_options = layout_options;
    if layout_options.seed.is_none() {
        layout_options.seed = opts.seed;
    }

    match id {
        LayoutId::Spectral => {
            if graph.node_count() > SPECTRAL_CEILING {
                return Err(Error::GraphTooLarge {
                    nodes: graph.node_count(),
                    limit: SPECTRAL_CEILING,
                });
            }
        }
        LayoutId::Bipartite => {
            if !crate::layout::partite::is_bipartite(&graph) {
                return Err(Error::layout_precondition("graph is not bipartite"));
            }
        }
        _ => {}
    }

    let scheduler = scheduler_for(opts);
    let payload = GraphPayload::from_graph(&graph);

    if id == LayoutId::Spectral && layout_options.node_properties.is_none() {
        let handle = scheduler.submit(Algorithm::LaplacianEigenvectors, payload.clone())?;
        match handle.join()? {
            TaskOutput::Pairs(eigenvectors) => {
                layout_options.node_properties = Some(eigenvectors);
            }
            other => unreachable!("laplacian task returned {:?}", other),
        }
    }

    let handle = scheduler.submit(
        Algorithm::Layout {
            id,
            options: layout_options,
        },
        payload,
    )?;
    let positions = match handle.join()? {
        TaskOutput::Layout(positions) => positions,
        other => unreachable!("layout task returned {:?}", other),
    };

    let mut result = IndexMap::with_capacity(positions.len());
    for (canonical, node_id, _) in interner.iter() {
        if let Some(&(x, y)) = positions.get(&node_id) {
            result.insert(canonical.to_string(), Position { x, y });
        }
    }
    Ok(result)
}
