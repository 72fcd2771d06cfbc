//! Deterministic geometric layouts: random, circular, spiral, shell.

use std::collections::BTreeMap;

use rand::Rng;

use crate::core::error::Error;
use crate::core::types::{Graph, NodeId};
use crate::layout::{Frame, LayoutOptions, LayoutResult, create_rng};

/// Uniform placement inside the padded rectangle, seeded.
pub fn random_layout(graph: &Graph, options: &LayoutOptions) -> Result<LayoutResult, Error> {
    let frame = Frame::from_options(options);
    let mut rng = create_rng(options.seed);
    let mut result = LayoutResult::new();
    for node in graph.nodes() {
        let x = frame.x0 + rng.random_range(0.0..=1.0) * frame.width;
        let y = frame.y0 + rng.random_range(0.0..=1.0) * frame.height;
        result.insert(node, (x, y));
    }
    Ok(result)
}

/// Equally spaced points on the circle inscribed in the padded rectangle,
/// in insertion order.
pub fn circular_layout(graph: &Graph, options: &LayoutOptions) -> Result<LayoutResult, Error> {
    let frame = Frame::from_options(options);
    let (cx, cy) = frame.center();
    let radius = frame.width.min(frame.height) / 2.0;

    let nodes: Vec<NodeId> = graph.nodes().collect();
    let n = nodes.len();
    let mut result = LayoutResult::with_capacity(n);
    for (i, node) in nodes.into_iter().enumerate() {
        let angle = 2.0 * std::f64::consts::PI * i as f64 / n.max(1) as f64;
        result.insert(node, (cx + radius * angle.cos(), cy + radius * angle.sin()));
    }
    Ok(result)
}

/// Archimedean spiral in insertion order. `resolution` sets the angular step
/// per node (default 0.35 turns-ish in radians).
pub fn spiral_layout(graph: &Graph, options: &LayoutOptions) -> Result<LayoutResult, Error> {
    let frame = Frame::from_options(options);
    let (cx, cy) = frame.center();
    let max_radius = frame.width.min(frame.height) / 2.0;
    let step = options.resolution.unwrap_or(0.35) * 2.0 * std::f64::consts::PI;

    let nodes: Vec<NodeId> = graph.nodes().collect();
    let n = nodes.len();
    let mut result = LayoutResult::with_capacity(n);
    for (i, node) in nodes.into_iter().enumerate() {
        let angle = step * i as f64;
        let radius = if n > 1 {
            max_radius * i as f64 / (n - 1) as f64
        } else {
            0.0
        };
        result.insert(node, (cx + radius * angle.cos(), cy + radius * angle.sin()));
    }
    Ok(result)
}

/// Concentric circles grouped by an external partition; without one, nodes
/// are bucketed by degree (low-degree shells outermost).
pub fn shell_layout(graph: &Graph, options: &LayoutOptions) -> Result<LayoutResult, Error> {
    let frame = Frame::from_options(options);
    let (cx, cy) = frame.center();
    let max_radius = frame.width.min(frame.height) / 2.0;

    // shell id -> members, insertion order preserved within a shell.
    let mut shells: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
    match &options.groups {
        Some(groups) => {
            for node in graph.nodes() {
                let group = groups.get(&node).copied().unwrap_or(0);
                shells.entry(group).or_default().push(node);
            }
        }
        None => {
            // Degree buckets: rank of the node's degree among distinct
            // degrees, hubs innermost.
            let mut degrees: Vec<usize> = graph.nodes().map(|n| graph.degree(n)).collect();
            degrees.sort_unstable();
            degrees.dedup();
            for node in graph.nodes() {
                let degree = graph.degree(node);
                let rank = degrees.iter().rev().position(|&d| d == degree).unwrap_or(0);
                shells.entry(rank).or_default().push(node);
            }
        }
    }

    let shell_count = shells.len();
    let mut result = LayoutResult::new();
    for (shell_index, (_, members)) in shells.into_iter().enumerate() {
        let radius = max_radius * (shell_index + 1) as f64 / shell_count.max(1) as f64;
        for (i, node) in members.iter().enumerate() {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / members.len().max(1) as f64;
            result.insert(*node, (cx + radius * angle.cos(), cy + radius * angle.sin()));
        }
    }
    Ok(result)
}
