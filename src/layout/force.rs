//! Force-directed layout (Fruchterman-Reingold).

use rand::Rng;

use crate::core::error::Error;
use crate::core::scheduler::TaskContext;
use crate::core::types::{Graph, NodeId, NodeMap};
use crate::layout::{Frame, LayoutOptions, LayoutResult, create_rng};

const DEFAULT_ITERATIONS: usize = 50;
const MIN_DISTANCE: f64 = 0.01;

/// Fruchterman-Reingold: repulsion `k²/d` between all pairs, attraction
/// `d²/k` along edges, with the temperature cooling linearly over the run
/// (or geometrically when `cooling_factor` is set). Positions are clamped to
/// the padded frame after every step.
pub fn fruchterman_reingold(
    graph: &Graph,
    options: &LayoutOptions,
    ctx: &TaskContext,
) -> Result<LayoutResult, Error> {
    let frame = Frame::from_options(options);
    let nodes: Vec<NodeId> = graph.nodes().collect();
    let n = nodes.len();
    let mut result = LayoutResult::with_capacity(n);
    if n == 0 {
        return Ok(result);
    }

    // Seeded random start inside the frame.
    let mut rng = create_rng(options.seed);
    for &node in &nodes {
        let x = frame.x0 + rng.random_range(0.0..=1.0) * frame.width;
        let y = frame.y0 + rng.random_range(0.0..=1.0) * frame.height;
        result.insert(node, (x, y));
    }
    if n == 1 {
        return Ok(result);
    }

    let area = frame.width * frame.height;
    let k = options.k.unwrap_or_else(|| (area / n as f64).sqrt());
    let iterations = options.iterations.unwrap_or(DEFAULT_ITERATIONS).max(1);
    let initial_temperature = frame.width.max(frame.height) / 10.0;

    for iteration in 0..iterations {
        ctx.checkpoint()?;

        let mut displacements: NodeMap<(f64, f64)> =
            nodes.iter().map(|&node| (node, (0.0, 0.0))).collect();

        // Repulsion between all pairs.
        for i in 0..n {
            let mut dx = 0.0;
            let mut dy = 0.0;
            let (xi, yi) = result[&nodes[i]];
            for j in 0..n {
                if i == j {
                    continue;
                }
                let (xj, yj) = result[&nodes[j]];
                let delta_x = xi - xj;
                let delta_y = yi - yj;
                let distance = (delta_x * delta_x + delta_y * delta_y).sqrt().max(MIN_DISTANCE);
                let force = k * k / distance;
                dx += delta_x / distance * force;
                dy += delta_y / distance * force;
            }
            let slot = displacements.get_mut(&nodes[i]).expect("initialised above");
            slot.0 += dx;
            slot.1 += dy;
        }

        // Attraction along edges.
        for (u, v, _) in graph.edges() {
            let (xu, yu) = result[&u];
            let (xv, yv) = result[&v];
            let delta_x = xv - xu;
            let delta_y = yv - yu;
            let distance = (delta_x * delta_x + delta_y * delta_y).sqrt().max(MIN_DISTANCE);
            let force = distance * distance / k;
            if let Some(slot) = displacements.get_mut(&u) {
                slot.0 += delta_x / distance * force;
                slot.1 += delta_y / distance * force;
            }
            if let Some(slot) = displacements.get_mut(&v) {
                slot.0 -= delta_x / distance * force;
                slot.1 -= delta_y / distance * force;
            }
        }

        let temperature = match options.cooling_factor {
            Some(factor) => initial_temperature * factor.powi(iteration as i32),
            None => initial_temperature * (1.0 - iteration as f64 / iterations as f64),
        };

        // Displace, capped by temperature, then clamp into the frame.
        for &node in &nodes {
            let (dx, dy) = displacements[&node];
            let length = (dx * dx + dy * dy).sqrt();
            if length > 0.0 {
                let limited = length.min(temperature);
                let position = result.get_mut(&node).expect("initialised above");
                let (x, y) = frame.clamp(
                    position.0 + dx / length * limited,
                    position.1 + dy / length * limited,
                );
                *position = (x, y);
            }
        }

        ctx.progress((iteration + 1) as f64 / iterations as f64);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutId;

    fn in_frame(result: &LayoutResult, options: &LayoutOptions) -> bool {
        result.values().all(|&(x, y)| {
            x.is_finite()
                && y.is_finite()
                && x >= options.padding
                && x <= options.width - options.padding
                && y >= options.padding
                && y <= options.height - options.padding
        })
    }

    fn path(n: u32) -> Graph {
        let mut g = Graph::new();
        for i in 1..n {
            g.add_edge(NodeId::new(i - 1), NodeId::new(i), 1.0).unwrap();
        }
        g
    }

    #[test]
    fn test_stays_in_frame() {
        let g = path(10);
        let options = LayoutOptions {
            seed: Some(1),
            ..LayoutOptions::default()
        };
        let result = fruchterman_reingold(&g, &options, &TaskContext::detached()).unwrap();
        assert_eq!(result.len(), 10);
        assert!(in_frame(&result, &options));
    }

    #[test]
    fn test_seeded_determinism() {
        let g = path(8);
        let options = LayoutOptions {
            seed: Some(99),
            ..LayoutOptions::default()
        };
        let a = fruchterman_reingold(&g, &options, &TaskContext::detached()).unwrap();
        let b = fruchterman_reingold(&g, &options, &TaskContext::detached()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_adjacent_closer_than_distant() {
        // On a long path, endpoints should end up farther apart than
        // adjacent nodes once forces settle.
        let g = path(6);
        let options = LayoutOptions {
            seed: Some(3),
            iterations: Some(200),
            ..LayoutOptions::default()
        };
        let result = fruchterman_reingold(&g, &options, &TaskContext::detached()).unwrap();
        let d = |a: u32, b: u32| {
            let (xa, ya) = result[&NodeId::new(a)];
            let (xb, yb) = result[&NodeId::new(b)];
            ((xa - xb).powi(2) + (ya - yb).powi(2)).sqrt()
        };
        assert!(d(0, 1) < d(0, 5));
    }

    #[test]
    fn test_dispatch_through_layout_id() {
        let g = path(4);
        let options = LayoutOptions {
            seed: Some(5),
            ..LayoutOptions::default()
        };
        let result = crate::layout::compute_layout(
            &g,
            LayoutId::ForceDirected,
            &options,
            &TaskContext::detached(),
        )
        .unwrap();
        assert_eq!(result.len(), 4);
    }
}
