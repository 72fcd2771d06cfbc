//! Kamada-Kawai layout: stress minimisation against ideal distances.
//!
//! Ideal inter-node distances are all-pairs shortest-path hop counts scaled
//! by the ideal edge length. The energy is minimised by repeated per-node
//! Newton steps on the node with the largest gradient, in unit space, and
//! the result is rescaled into the padded frame.

use crate::core::error::Error;
use crate::core::metrics::bfs_distances;
use crate::core::scheduler::TaskContext;
use crate::core::types::{Graph, NodeId};
use crate::layout::{Frame, LayoutOptions, LayoutResult, rescale_to_frame};

const DEFAULT_ITERATIONS: usize = 300;
const GRADIENT_TOL: f64 = 1e-4;
const MIN_DISTANCE: f64 = 1e-9;

/// Kamada-Kawai energy minimisation. Pairs in different components carry no
/// spring and keep their relative placement from the circular start.
pub fn kamada_kawai(
    graph: &Graph,
    options: &LayoutOptions,
    ctx: &TaskContext,
) -> Result<LayoutResult, Error> {
    let frame = Frame::from_options(options);
    let nodes: Vec<NodeId> = graph.nodes().collect();
    let n = nodes.len();
    if n == 0 {
        return Ok(LayoutResult::new());
    }
    if n == 1 {
        let mut result = LayoutResult::new();
        result.insert(nodes[0], frame.center());
        return Ok(result);
    }

    let index: std::collections::HashMap<NodeId, usize> =
        nodes.iter().enumerate().map(|(i, &v)| (v, i)).collect();

    // Ideal distances: hop counts scaled by the ideal edge length; infinity
    // marks uncoupled (cross-component) pairs.
    let edge_length = options.ideal_edge_length.unwrap_or(1.0);
    let mut ideal = vec![f64::INFINITY; n * n];
    for (i, &source) in nodes.iter().enumerate() {
        for (target, hops) in bfs_distances(graph, source) {
            ideal[i * n + index[&target]] = hops as f64 * edge_length;
        }
    }

    // Deterministic circular start avoids coincident positions.
    let mut xs = vec![0.0; n];
    let mut ys = vec![0.0; n];
    let radius = n as f64 / 2.0;
    for i in 0..n {
        let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
        xs[i] = radius * angle.cos();
        ys[i] = radius * angle.sin();
    }

    let max_iter = options.iterations.unwrap_or(DEFAULT_ITERATIONS);
    let gradient = |m: usize, xs: &[f64], ys: &[f64]| {
        let mut gx = 0.0;
        let mut gy = 0.0;
        for i in 0..n {
            if i == m {
                continue;
            }
            let l = ideal[m * n + i];
            if !l.is_finite() || l == 0.0 {
                continue;
            }
            let k = 1.0 / (l * l);
            let dx = xs[m] - xs[i];
            let dy = ys[m] - ys[i];
            let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
            gx += k * dx * (1.0 - l / dist);
            gy += k * dy * (1.0 - l / dist);
        }
        (gx, gy)
    };

    for iteration in 0..max_iter {
        ctx.checkpoint()?;

        // Node with the steepest gradient moves next.
        let mut worst = 0usize;
        let mut worst_norm = 0.0;
        for m in 0..n {
            let (gx, gy) = gradient(m, &xs, &ys);
            let norm = (gx * gx + gy * gy).sqrt();
            if norm > worst_norm {
                worst_norm = norm;
                worst = m;
            }
        }
        if worst_norm < GRADIENT_TOL {
            break;
        }

        // One 2x2 Newton step for the selected node.
        let m = worst;
        let (gx, gy) = gradient(m, &xs, &ys);
        let mut dxx = 0.0;
        let mut dxy = 0.0;
        let mut dyy = 0.0;
        for i in 0..n {
            if i == m {
                continue;
            }
            let l = ideal[m * n + i];
            if !l.is_finite() || l == 0.0 {
                continue;
            }
            let k = 1.0 / (l * l);
            let dx = xs[m] - xs[i];
            let dy = ys[m] - ys[i];
            let dist = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
            let cubed = dist * dist * dist;
            dxx += k * (1.0 - l * dy * dy / cubed);
            dxy += k * l * dx * dy / cubed;
            dyy += k * (1.0 - l * dx * dx / cubed);
        }
        let det = dxx * dyy - dxy * dxy;
        if det.abs() < MIN_DISTANCE {
            break;
        }
        xs[m] += (dxy * gy - dyy * gx) / det;
        ys[m] += (dxy * gx - dxx * gy) / det;

        ctx.progress((iteration + 1) as f64 / max_iter as f64);
    }

    let raw: Vec<(NodeId, (f64, f64))> = nodes
        .iter()
        .enumerate()
        .map(|(i, &node)| (node, (xs[i], ys[i])))
        .collect();
    Ok(rescale_to_frame(&raw, frame))
}
