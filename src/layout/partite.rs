//! Axis-aligned layouts: bipartite, multipartite, and BFS layers.

use std::collections::BTreeMap;

use crate::core::error::Error;
use crate::core::metrics::bfs_distances;
use crate::core::types::{Graph, NodeId, NodeMap};
use crate::layout::{Align, Frame, LayoutOptions, LayoutResult};

/// Places each group on its own axis: vertical columns spread left to right,
/// or horizontal rows with `Align::Horizontal`. Members spread evenly along
/// the axis in insertion order.
fn layered(groups: Vec<Vec<NodeId>>, options: &LayoutOptions) -> LayoutResult {
    let frame = Frame::from_options(options);
    let count = groups.len();
    let mut result = LayoutResult::new();

    for (axis_index, members) in groups.into_iter().enumerate() {
        let along = if count > 1 {
            axis_index as f64 / (count - 1) as f64
        } else {
            0.5
        };
        let size = members.len();
        for (i, node) in members.into_iter().enumerate() {
            let across = (i as f64 + 0.5) / size.max(1) as f64;
            let (x, y) = match options.align {
                Align::Vertical => (
                    frame.x0 + along * frame.width,
                    frame.y0 + across * frame.height,
                ),
                Align::Horizontal => (
                    frame.x0 + across * frame.width,
                    frame.y0 + along * frame.height,
                ),
            };
            result.insert(node, (x, y));
        }
    }
    result
}

/// 2-colours the graph by BFS, component by component. Returns `None` when
/// an odd cycle makes the graph non-bipartite.
fn two_coloring(graph: &Graph) -> Option<NodeMap<usize>> {
    let mut colors: NodeMap<usize> = NodeMap::new();
    for start in graph.nodes() {
        if colors.contains_key(&start) {
            continue;
        }
        colors.insert(start, 0);
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(start);
        while let Some(node) = queue.pop_front() {
            let color = colors[&node];
            for neighbor in graph.neighbors(node) {
                match colors.get(&neighbor) {
                    None => {
                        colors.insert(neighbor, 1 - color);
                        queue.push_back(neighbor);
                    }
                    Some(&c) if c == color => return None,
                    Some(_) => {}
                }
            }
        }
    }
    Some(colors)
}

/// True when the graph admits a 2-colouring.
pub(crate) fn is_bipartite(graph: &Graph) -> bool {
    two_coloring(graph).is_some()
}

/// Two parallel axes, one per colour class of the 2-colouring. Fails with
/// `LayoutPreconditionUnmet` when the graph is not bipartite.
pub fn bipartite_layout(graph: &Graph, options: &LayoutOptions) -> Result<LayoutResult, Error> {
    let colors = two_coloring(graph)
        .ok_or_else(|| Error::layout_precondition("graph is not bipartite"))?;

    let mut sides: Vec<Vec<NodeId>> = vec![Vec::new(), Vec::new()];
    for node in graph.nodes() {
        sides[colors[&node]].push(node);
    }
    Ok(layered(sides, options))
}

/// Parallel axes for an externally supplied group property, one axis per
/// distinct group id in ascending order.
pub fn multipartite_layout(graph: &Graph, options: &LayoutOptions) -> Result<LayoutResult, Error> {
    let groups = options.groups.as_ref().ok_or_else(|| {
        Error::layout_precondition("multipartite layout requires a group assignment")
    })?;

    let mut layers: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
    for node in graph.nodes() {
        let group = groups.get(&node).copied().unwrap_or(0);
        layers.entry(group).or_default().push(node);
    }
    Ok(layered(layers.into_values().collect(), options))
}

/// Parallel axes indexed by BFS distance from the start node (the first node
/// in insertion order when unset). Unreachable nodes share a final axis.
pub fn bfs_layout(graph: &Graph, options: &LayoutOptions) -> Result<LayoutResult, Error> {
    let start = match options.start_node.or_else(|| graph.nodes().next()) {
        Some(start) => start,
        None => return Ok(LayoutResult::new()),
    };
    if !graph.contains_node(start) {
        return Err(Error::no_such_node(format!("start node {}", start)));
    }

    let distances = bfs_distances(graph, start);
    let mut layers: BTreeMap<usize, Vec<NodeId>> = BTreeMap::new();
    let mut unreachable: Vec<NodeId> = Vec::new();
    for node in graph.nodes() {
        match distances.get(&node) {
            Some(&d) => layers.entry(d).or_default().push(node),
            None => unreachable.push(node),
        }
    }

    let mut groups: Vec<Vec<NodeId>> = layers.into_values().collect();
    if !unreachable.is_empty() {
        groups.push(unreachable);
    }
    Ok(layered(groups, options))
}
