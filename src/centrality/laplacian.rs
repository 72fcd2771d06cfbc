//! Laplacian eigenvectors for the spectral layout.
//!
//! Builds the unweighted combinatorial Laplacian `L = D − A` and extracts the
//! eigenvectors of the second- and third-smallest eigenvalues (the Fiedler
//! vector and its successor) by cyclic Jacobi rotation on the dense matrix.

use nalgebra::{DMatrix, DVector};

use crate::core::error::Error;
use crate::core::scheduler::TaskContext;
use crate::core::types::{Graph, NodeId, NodeMap};

const MAX_SWEEPS: usize = 100;
const OFF_DIAGONAL_TOL: f64 = 1e-18;

/// Cyclic Jacobi eigendecomposition of a symmetric matrix.
///
/// Returns the eigenvalues (diagonal after convergence) and the accumulated
/// rotation matrix whose columns are the eigenvectors.
fn jacobi_eigen(
    mut a: DMatrix<f64>,
    ctx: &TaskContext,
) -> Result<(DVector<f64>, DMatrix<f64>), Error> {
    let n = a.nrows();
    let mut v = DMatrix::<f64>::identity(n, n);

    for sweep in 0..MAX_SWEEPS {
        ctx.checkpoint()?;

        let off: f64 = (0..n)
            .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
            .map(|(p, q)| a[(p, q)] * a[(p, q)])
            .sum();
        if off < OFF_DIAGONAL_TOL {
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[(p, q)];
                if apq.abs() < f64::EPSILON {
                    continue;
                }
                let app = a[(p, p)];
                let aqq = a[(q, q)];
                let theta = (aqq - app) / (2.0 * apq);
                let t = if theta >= 0.0 {
                    1.0 / (theta + (1.0 + theta * theta).sqrt())
                } else {
                    1.0 / (theta - (1.0 + theta * theta).sqrt())
                };
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;
                let tau = s / (1.0 + c);

                a[(p, p)] = app - t * apq;
                a[(q, q)] = aqq + t * apq;
                a[(p, q)] = 0.0;
                a[(q, p)] = 0.0;
                for i in 0..n {
                    if i == p || i == q {
                        continue;
                    }
                    let aip = a[(i, p)];
                    let aiq = a[(i, q)];
                    a[(i, p)] = aip - s * (aiq + tau * aip);
                    a[(p, i)] = a[(i, p)];
                    a[(i, q)] = aiq + s * (aip - tau * aiq);
                    a[(q, i)] = a[(i, q)];
                }
                for i in 0..n {
                    let vip = v[(i, p)];
                    let viq = v[(i, q)];
                    v[(i, p)] = vip - s * (viq + tau * vip);
                    v[(i, q)] = viq + s * (vip - tau * viq);
                }
            }
        }
        ctx.progress((sweep + 1) as f64 / MAX_SWEEPS as f64);
    }

    Ok((a.diagonal(), v))
}

/// Per-node `(laplacian_x, laplacian_y)` coordinates: the Fiedler vector and
/// the eigenvector of the next-smallest eigenvalue. Graphs too small to carry
/// both eigenvectors fall back to zeroes for the missing axis.
pub fn laplacian_eigenvectors(
    graph: &Graph,
    ctx: &TaskContext,
) -> Result<NodeMap<(f64, f64)>, Error> {
    let nodes: Vec<NodeId> = graph.nodes().collect();
    let n = nodes.len();
    if n == 0 {
        return Ok(NodeMap::new());
    }
    if n == 1 {
        return Ok(nodes.into_iter().map(|node| (node, (0.0, 0.0))).collect());
    }

    let index: NodeMap<usize> = nodes.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    let mut laplacian = DMatrix::<f64>::zeros(n, n);
    for (i, &node) in nodes.iter().enumerate() {
        laplacian[(i, i)] = graph.degree(node) as f64;
    }
    for (u, v, _) in graph.edges() {
        let ui = index[&u];
        let vi = index[&v];
        laplacian[(ui, vi)] = -1.0;
        laplacian[(vi, ui)] = -1.0;
    }

    let (eigenvalues, eigenvectors) = jacobi_eigen(laplacian, ctx)?;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        eigenvalues[a]
            .partial_cmp(&eigenvalues[b])
            .expect("Laplacian eigenvalues are finite")
    });

    let fiedler = order[1];
    let third = order.get(2).copied();
    Ok(nodes
        .into_iter()
        .enumerate()
        .map(|(i, node)| {
            let x = eigenvectors[(i, fiedler)];
            let y = third.map_or(0.0, |col| eigenvectors[(i, col)]);
            (node, (x, y))
        })
        .collect())
}
