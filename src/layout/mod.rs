/*!
# Layout Family

2-D coordinate assignments for graph drawing. All layouts accept a common
`{width, height, padding, seed}` frame plus per-layout options (each layout
reads only its relevant subset) and place every node inside the padded
rectangle `[padding, width-padding] × [padding, height-padding]`.

Precondition enforcement (running the Laplacian eigenvectors for the
spectral layout, verifying 2-colourability for the bipartite layout) is the
analysis facade's job; the layout functions themselves fail with
`LayoutPreconditionUnmet` when handed inputs that do not satisfy them.
*/

pub mod force;
pub mod geometric;
pub mod kamada_kawai;
pub mod partite;
pub mod spectral;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::core::error::Error;
use crate::core::scheduler::TaskContext;
use crate::core::types::{Graph, NodeId, NodeMap};

/// Coordinates per node.
pub type LayoutResult = NodeMap<(f64, f64)>;

/// Identifiers of the available layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutId {
    Random,
    Circular,
    Spiral,
    Shell,
    Bipartite,
    Multipartite,
    Bfs,
    Spectral,
    ForceDirected,
    KamadaKawai,
}

impl LayoutId {
    /// All layouts, in registry listing order.
    pub const ALL: [LayoutId; 10] = [
        LayoutId::Bfs,
        LayoutId::Bipartite,
        LayoutId::Circular,
        LayoutId::ForceDirected,
        LayoutId::KamadaKawai,
        LayoutId::Multipartite,
        LayoutId::Random,
        LayoutId::Shell,
        LayoutId::Spectral,
        LayoutId::Spiral,
    ];

    /// Parses a layout id, rejecting unknown names.
    pub fn parse(id: &str) -> Result<Self, Error> {
        match id {
            "random" => Ok(LayoutId::Random),
            "circular" => Ok(LayoutId::Circular),
            "spiral" => Ok(LayoutId::Spiral),
            "shell" => Ok(LayoutId::Shell),
            "bipartite" => Ok(LayoutId::Bipartite),
            "multipartite" => Ok(LayoutId::Multipartite),
            "bfs" => Ok(LayoutId::Bfs),
            "spectral" => Ok(LayoutId::Spectral),
            "force-directed" => Ok(LayoutId::ForceDirected),
            "kamada-kawai" => Ok(LayoutId::KamadaKawai),
            other => Err(Error::unknown_algorithm(other)),
        }
    }

    /// The external string id.
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutId::Random => "random",
            LayoutId::Circular => "circular",
            LayoutId::Spiral => "spiral",
            LayoutId::Shell => "shell",
            LayoutId::Bipartite => "bipartite",
            LayoutId::Multipartite => "multipartite",
            LayoutId::Bfs => "bfs",
            LayoutId::Spectral => "spectral",
            LayoutId::ForceDirected => "force-directed",
            LayoutId::KamadaKawai => "kamada-kawai",
        }
    }
}

/// Orientation of the parallel axes used by the partite layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Groups form vertical columns spread left to right.
    #[default]
    Vertical,
    /// Groups form horizontal rows spread top to bottom.
    Horizontal,
}

/// Options shared by the layout family. Unknown combinations are ignored by
/// layouts that do not read them.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub seed: Option<u64>,
    /// Iteration cap for the iterative layouts.
    pub iterations: Option<usize>,
    /// Optimal inter-node distance for the force-directed layout.
    pub k: Option<f64>,
    /// Ideal edge length for Kamada-Kawai.
    pub ideal_edge_length: Option<f64>,
    /// Geometric cooling multiplier; the default cooling is linear.
    pub cooling_factor: Option<f64>,
    /// BFS layout start node.
    pub start_node: Option<NodeId>,
    /// Axis orientation for the partite layouts.
    pub align: Align,
    /// Angular step of the spiral layout, in radians per node.
    pub resolution: Option<f64>,
    /// Group assignment for the shell and multipartite layouts.
    pub groups: Option<NodeMap<usize>>,
    /// Precomputed per-node properties, e.g. Laplacian eigenvectors for the
    /// spectral layout.
    pub node_properties: Option<NodeMap<(f64, f64)>>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            padding: 50.0,
            seed: None,
            iterations: None,
            k: None,
            ideal_edge_length: None,
            cooling_factor: None,
            start_node: None,
            align: Align::default(),
            resolution: None,
            groups: None,
            node_properties: None,
        }
    }
}

/// The padded drawing rectangle.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub x0: f64,
    pub y0: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn from_options(options: &LayoutOptions) -> Self {
        let width = (options.width - 2.0 * options.padding).max(0.0);
        let height = (options.height - 2.0 * options.padding).max(0.0);
        Self {
            x0: options.padding,
            y0: options.padding,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x0 + self.width / 2.0, self.y0 + self.height / 2.0)
    }

    pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x.clamp(self.x0, self.x0 + self.width),
            y.clamp(self.y0, self.y0 + self.height),
        )
    }
}

/// Seeded RNG helper used by the randomised layouts.
pub(crate) fn create_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::seed_from_u64(rand::random::<u64>()),
    }
}

/// Linearly rescales raw coordinates into the frame. A degenerate axis (all
/// values equal) collapses to the frame's centre line.
pub(crate) fn rescale_to_frame(raw: &[(NodeId, (f64, f64))], frame: Frame) -> LayoutResult {
    let mut result = LayoutResult::with_capacity(raw.len());
    if raw.is_empty() {
        return result;
    }

    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, (x, y)) in raw {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    let (cx, cy) = frame.center();
    for &(node, (x, y)) in raw {
        let fx = if max_x > min_x {
            frame.x0 + (x - min_x) / (max_x - min_x) * frame.width
        } else {
            cx
        };
        let fy = if max_y > min_y {
            frame.y0 + (y - min_y) / (max_y - min_y) * frame.height
        } else {
            cy
        };
        result.insert(node, (fx, fy));
    }
    result
}

/// Runs the layout identified by `id`.
pub fn compute_layout(
    graph: &Graph,
    id: LayoutId,
    options: &LayoutOptions,
    ctx: &TaskContext,
) -> Result<LayoutResult, Error> {
    match id {
        LayoutId::Random => geometric::random_layout(graph, options),
        LayoutId::Circular => geometric::circular_layout(graph, options),
        LayoutId::Spiral => geometric::spiral_layout(graph, options),
        LayoutId::Shell => geometric::shell_layout(graph, options),
        LayoutId::Bipartite => partite::bipartite_layout(graph, options),
        LayoutId::Multipartite => partite::multipartite_layout(graph, options),
        LayoutId::Bfs => partite::bfs_layout(graph, options),
        LayoutId::Spectral => spectral::spectral_layout(graph, options),
        LayoutId::ForceDirected => force::fruchterman_reingold(graph, options, ctx),
        LayoutId::KamadaKawai => kamada_kawai::kamada_kawai(graph, options, ctx),
    }
}
