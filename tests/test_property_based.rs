use proptest::prelude::*;

use netrics::centrality::betweenness::betweenness_centrality;
use netrics::centrality::clustering::clustering_coefficients;
use netrics::centrality::degree::degree_centrality;
use netrics::centrality::eigenvector::eigenvector_centrality;
use netrics::community::louvain::{LouvainOptions, louvain};
use netrics::community::modularity::modularity;
use netrics::core::scheduler::TaskContext;
use netrics::core::serialization::GraphPayload;
use netrics::core::types::{Graph, NodeId, NodeMap};
use netrics::layout::{LayoutId, LayoutOptions, compute_layout};

/// Arbitrary valid edge lists: endpoints from a small universe, strictly
/// positive weights, no self-loops.
fn edge_list() -> impl Strategy<Value = Vec<(u32, u32, f64)>> {
    prop::collection::vec(
        (0u32..30, 0u32..30, 0.1f64..10.0).prop_filter("no self-loops", |(u, v, _)| u != v),
        0..100,
    )
}

fn build(edges: &[(u32, u32, f64)]) -> Graph {
    let mut g = Graph::new();
    for &(u, v, w) in edges {
        g.add_edge(NodeId::new(u), NodeId::new(v), w).unwrap();
    }
    g
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_degree_sum_is_twice_edge_count(edges in edge_list()) {
        let g = build(&edges);
        let degrees = degree_centrality(&g);
        let total: usize = degrees.values().sum();
        prop_assert_eq!(total, 2 * g.edge_count());
    }

    #[test]
    fn prop_metric_ranges(edges in edge_list()) {
        let g = build(&edges);
        let ctx = TaskContext::detached();

        let clustering = clustering_coefficients(&g, &ctx).unwrap();
        for &value in clustering.values() {
            prop_assert!((0.0..=1.0).contains(&value));
        }
        for node in g.nodes() {
            if g.degree(node) < 2 {
                prop_assert_eq!(clustering[&node], 0.0);
            }
        }

        let betweenness = betweenness_centrality(&g, &ctx).unwrap();
        for &value in betweenness.values() {
            prop_assert!((0.0..=1.0).contains(&value));
        }

        let eigenvector = eigenvector_centrality(&g, 10_000, 1e-6, &ctx).unwrap();
        for &value in eigenvector.values() {
            prop_assert!((0.0..=1.0 + 1e-9).contains(&value));
        }
    }

    #[test]
    fn prop_payload_round_trip(edges in edge_list()) {
        let g = build(&edges);
        let restored = GraphPayload::from_graph(&g).into_graph().unwrap();
        prop_assert_eq!(g.node_count(), restored.node_count());
        prop_assert_eq!(g.edge_count(), restored.edge_count());
        for (u, v, w) in g.edges() {
            prop_assert_eq!(restored.edge_weight(u, v), Some(w));
        }
    }

    #[test]
    fn prop_louvain_invariants(edges in edge_list(), seed in proptest::option::of(any::<u64>())) {
        let g = build(&edges);
        let options = LouvainOptions { seed, ..LouvainOptions::default() };
        let ctx = TaskContext::detached();

        let result = louvain(&g, &options, &ctx).unwrap();
        prop_assert!((-1.0..=1.0).contains(&result.modularity));

        // Ids dense in [0, num_communities).
        let mut ids: Vec<usize> = result.communities.values().copied().collect();
        ids.sort_unstable();
        ids.dedup();
        prop_assert_eq!(ids.len(), result.num_communities);
        if result.num_communities > 0 {
            prop_assert_eq!(*ids.last().unwrap(), result.num_communities - 1);
        }

        // At least as good as the singleton partition.
        let singletons: NodeMap<usize> = g.nodes().map(|n| (n, n.index())).collect();
        prop_assert!(result.modularity >= modularity(&g, &singletons, 1.0) - 1e-9);

        // Bit-identical re-run.
        let again = louvain(&g, &options, &ctx).unwrap();
        prop_assert_eq!(result, again);
    }

    #[test]
    fn prop_layouts_stay_in_frame(edges in edge_list(), seed in any::<u64>()) {
        let g = build(&edges);
        let options = LayoutOptions {
            width: 640.0,
            height: 480.0,
            padding: 20.0,
            seed: Some(seed),
            ..LayoutOptions::default()
        };
        let ctx = TaskContext::detached();
        for id in [LayoutId::Random, LayoutId::Circular, LayoutId::Spiral, LayoutId::Shell,
                   LayoutId::ForceDirected, LayoutId::KamadaKawai] {
            let result = compute_layout(&g, id, &options, &ctx).unwrap();
            prop_assert_eq!(result.len(), g.node_count());
            for &(x, y) in result.values() {
                prop_assert!(x.is_finite() && y.is_finite());
                prop_assert!((20.0..=620.0).contains(&x));
                prop_assert!((20.0..=460.0).contains(&y));
            }
        }
    }

    #[test]
    fn prop_seeded_random_layout_is_deterministic(edges in edge_list(), seed in any::<u64>()) {
        let g = build(&edges);
        let options = LayoutOptions { seed: Some(seed), ..LayoutOptions::default() };
        let ctx = TaskContext::detached();
        let a = compute_layout(&g, LayoutId::Random, &options, &ctx).unwrap();
        let b = compute_layout(&g, LayoutId::Random, &options, &ctx).unwrap();
        prop_assert_eq!(a, b);
    }
}
