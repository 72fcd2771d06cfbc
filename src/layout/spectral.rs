//! Spectral layout from precomputed Laplacian eigenvectors.

use crate::core::error::Error;
use crate::core::types::{Graph, NodeId};
use crate::layout::{Frame, LayoutOptions, LayoutResult, rescale_to_frame};

/// Coordinates are the per-node `(Fiedler, next)` Laplacian eigenvector
/// entries, linearly rescaled into the padded frame. The eigenvectors must
/// arrive precomputed through `node_properties`; the analysis facade runs
/// the Laplacian metric first when the caller did not supply them.
pub fn spectral_layout(graph: &Graph, options: &LayoutOptions) -> Result<LayoutResult, Error> {
    let eigenvectors = options.node_properties.as_ref().ok_or_else(|| {
        Error::layout_precondition("spectral layout requires precomputed Laplacian eigenvectors")
    })?;

    let mut raw: Vec<(NodeId, (f64, f64))> = Vec::with_capacity(graph.node_count());
    for node in graph.nodes() {
        let &(x, y) = eigenvectors.get(&node).ok_or_else(|| {
            Error::layout_precondition(format!("missing Laplacian eigenvectors for node {}", node))
        })?;
        raw.push((node, (x, y)));
    }

    Ok(rescale_to_frame(&raw, Frame::from_options(options)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centrality::laplacian::laplacian_eigenvectors;
    use crate::core::scheduler::TaskContext;

    #[test]
    fn test_requires_node_properties() {
        let mut g = Graph::new();
        g.add_node(NodeId::new(0));
        let err = spectral_layout(&g, &LayoutOptions::default()).unwrap_err();
        assert_eq!(err.kind(), "LayoutPreconditionUnmet");
    }

    #[test]
    fn test_path_spreads_across_frame() {
        let mut g = Graph::new();
        for i in 1..5u32 {
            g.add_edge(NodeId::new(i - 1), NodeId::new(i), 1.0).unwrap();
        }
        let eigens = laplacian_eigenvectors(&g, &TaskContext::detached()).unwrap();
        let options = LayoutOptions {
            node_properties: Some(eigens),
            ..LayoutOptions::default()
        };
        let result = spectral_layout(&g, &options).unwrap();
        // The Fiedler vector is monotone on a path, so the x-extremes are
        // the path endpoints, stretched to the frame edges.
        let xs: Vec<f64> = (0..5).map(|i| result[&NodeId::new(i)].0).collect();
        let min = xs.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(min, 50.0);
        assert_eq!(max, 950.0);
        assert!(xs[0] == min || xs[0] == max);
        assert!(xs[4] == min || xs[4] == max);
    }

    #[test]
    fn test_missing_node_entry_fails() {
        let mut g = Graph::new();
        g.add_edge(NodeId::new(0), NodeId::new(1), 1.0).unwrap();
        let mut eigens = crate::core::types::NodeMap::new();
        eigens.insert(NodeId::new(0), (0.1, 0.2));
        let options = LayoutOptions {
            node_properties: Some(eigens),
            ..LayoutOptions::default()
        };
        assert!(spectral_layout(&g, &options).is_err());
    }
}
