use netrics::centrality::betweenness::betweenness_centrality;
use netrics::centrality::cliques::clique_membership;
use netrics::centrality::clustering::clustering_coefficients;
use netrics::centrality::degree::degree_centrality;
use netrics::centrality::eigenvector::eigenvector_centrality;
use netrics::core::scheduler::TaskContext;
use netrics::core::types::{Graph, NodeId};

fn node(i: u32) -> NodeId {
    NodeId::new(i)
}

fn triangle() -> Graph {
    let mut g = Graph::new();
    g.add_edge(node(0), node(1), 1.0).unwrap();
    g.add_edge(node(1), node(2), 1.0).unwrap();
    g.add_edge(node(2), node(0), 1.0).unwrap();
    g
}

fn path4() -> Graph {
    let mut g = Graph::new();
    g.add_edge(node(0), node(1), 1.0).unwrap();
    g.add_edge(node(1), node(2), 1.0).unwrap();
    g.add_edge(node(2), node(3), 1.0).unwrap();
    g
}

fn star5() -> Graph {
    let mut g = Graph::new();
    for leaf in 1..=5 {
        g.add_edge(node(0), node(leaf), 1.0).unwrap();
    }
    g
}

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

#[test]
fn test_triangle_scenario() {
    let g = triangle();
    let ctx = TaskContext::detached();

    let degrees = degree_centrality(&g);
    let clustering = clustering_coefficients(&g, &ctx).unwrap();
    let betweenness = betweenness_centrality(&g, &ctx).unwrap();
    let eigenvector = eigenvector_centrality(&g, 100_000, 1e-6, &ctx).unwrap();
    let cliques = clique_membership(&g, &ctx).unwrap();

    for n in g.nodes() {
        assert_eq!(degrees[&n], 2);
        assert!(approx_eq(clustering[&n], 1.0, 1e-12));
        assert!(approx_eq(betweenness[&n], 0.0, 1e-12));
        assert!(approx_eq(eigenvector[&n], 0.57735, 1e-4));
        assert_eq!(cliques[&n], 1);
    }
}

#[test]
fn test_path_scenario() {
    let g = path4();
    let ctx = TaskContext::detached();

    let degrees = degree_centrality(&g);
    assert_eq!(degrees[&node(0)], 1);
    assert_eq!(degrees[&node(1)], 2);
    assert_eq!(degrees[&node(2)], 2);
    assert_eq!(degrees[&node(3)], 1);

    let betweenness = betweenness_centrality(&g, &ctx).unwrap();
    assert!(approx_eq(betweenness[&node(0)], 0.0, 1e-12));
    assert!(approx_eq(betweenness[&node(1)], 2.0 / 3.0, 1e-12));
    assert!(approx_eq(betweenness[&node(2)], 2.0 / 3.0, 1e-12));
    assert!(approx_eq(betweenness[&node(3)], 0.0, 1e-12));

    let clustering = clustering_coefficients(&g, &ctx).unwrap();
    assert!(clustering.values().all(|&v| v == 0.0));
}

#[test]
fn test_star_scenario() {
    let g = star5();
    let ctx = TaskContext::detached();

    let betweenness = betweenness_centrality(&g, &ctx).unwrap();
    assert!(approx_eq(betweenness[&node(0)], 1.0, 1e-12));
    for leaf in 1..=5 {
        assert!(approx_eq(betweenness[&node(leaf)], 0.0, 1e-12));
    }

    let clustering = clustering_coefficients(&g, &ctx).unwrap();
    assert_eq!(clustering[&node(0)], 0.0);
}

#[test]
fn test_single_node_boundaries() {
    let mut g = Graph::new();
    g.add_node(node(0));
    let ctx = TaskContext::detached();

    assert_eq!(degree_centrality(&g)[&node(0)], 0);
    assert_eq!(clustering_coefficients(&g, &ctx).unwrap()[&node(0)], 0.0);
    assert_eq!(eigenvector_centrality(&g, 1000, 1e-6, &ctx).unwrap()[&node(0)], 0.0);
    assert_eq!(betweenness_centrality(&g, &ctx).unwrap()[&node(0)], 0.0);
    assert_eq!(clique_membership(&g, &ctx).unwrap()[&node(0)], 1);
}

#[test]
fn test_empty_graph_returns_empty_maps() {
    let g = Graph::new();
    let ctx = TaskContext::detached();
    assert!(degree_centrality(&g).is_empty());
    assert!(clustering_coefficients(&g, &ctx).unwrap().is_empty());
    assert!(eigenvector_centrality(&g, 1000, 1e-6, &ctx).unwrap().is_empty());
    assert!(betweenness_centrality(&g, &ctx).unwrap().is_empty());
    assert!(clique_membership(&g, &ctx).unwrap().is_empty());
}

#[test]
fn test_metric_ranges_on_a_denser_graph() {
    // Wheel-ish graph: cycle plus a hub.
    let mut g = Graph::new();
    for i in 1..=8u32 {
        let next = if i == 8 { 1 } else { i + 1 };
        g.add_edge(node(i), node(next), 1.0).unwrap();
        g.add_edge(node(0), node(i), 1.0).unwrap();
    }
    let ctx = TaskContext::detached();

    let betweenness = betweenness_centrality(&g, &ctx).unwrap();
    assert!(betweenness.values().all(|&v| (0.0..=1.0).contains(&v)));

    let clustering = clustering_coefficients(&g, &ctx).unwrap();
    assert!(clustering.values().all(|&v| (0.0..=1.0).contains(&v)));

    let eigenvector = eigenvector_centrality(&g, 100_000, 1e-6, &ctx).unwrap();
    assert!(eigenvector.values().all(|&v| (0.0..=1.0).contains(&v)));
    let norm: f64 = eigenvector.values().map(|v| v * v).sum::<f64>().sqrt();
    assert!(approx_eq(norm, 1.0, 1e-6));
}
