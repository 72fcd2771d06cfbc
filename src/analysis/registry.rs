/*!
# Algorithm Registry

Catalogues of the engine's features, layouts, and community algorithms:
string id to descriptor with name, description, default options, and required
preconditions. Lookup is O(1) over the small static tables; listings are
stable alphabetical for UX.
*/

use crate::core::error::Error;

/// Per-node features the analysis facade can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Degree,
    Eigenvector,
    Betweenness,
    Clustering,
    Cliques,
    Modularity,
    EigenvectorLaplacian,
}

impl Feature {
    /// All features, in registry listing order.
    pub const ALL: [Feature; 7] = [
        Feature::Betweenness,
        Feature::Cliques,
        Feature::Clustering,
        Feature::Degree,
        Feature::Eigenvector,
        Feature::EigenvectorLaplacian,
        Feature::Modularity,
    ];

    /// Parses a feature id, rejecting unknown names.
    pub fn parse(id: &str) -> Result<Self, Error> {
        match id {
            "degree" => Ok(Feature::Degree),
            "eigenvector" => Ok(Feature::Eigenvector),
            "betweenness" => Ok(Feature::Betweenness),
            "clustering" => Ok(Feature::Clustering),
            "cliques" => Ok(Feature::Cliques),
            "modularity" => Ok(Feature::Modularity),
            "eigenvector-laplacian" => Ok(Feature::EigenvectorLaplacian),
            other => Err(Error::unknown_feature(other)),
        }
    }

    /// The external string id.
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Degree => "degree",
            Feature::Eigenvector => "eigenvector",
            Feature::Betweenness => "betweenness",
            Feature::Clustering => "clustering",
            Feature::Cliques => "cliques",
            Feature::Modularity => "modularity",
            Feature::EigenvectorLaplacian => "eigenvector-laplacian",
        }
    }
}

/// Catalogue entry: id, human name, description, documented option defaults,
/// and preconditions the facade enforces before scheduling.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub default_options: &'static [(&'static str, &'static str)],
    pub preconditions: &'static [&'static str],
}

/// Layout catalogue, alphabetical by id.
pub const LAYOUTS: [Descriptor; 10] = [
    Descriptor {
        id: "bfs",
        name: "BFS layers",
        description: "Parallel axes indexed by BFS distance from a start node",
        default_options: &[("start_node", "first node in insertion order")],
        preconditions: &[],
    },
    Descriptor {
        id: "bipartite",
        name: "Bipartite",
        description: "Two parallel axes, one per colour class of a 2-colouring",
        default_options: &[("align", "vertical")],
        preconditions: &["graph must be bipartite"],
    },
    Descriptor {
        id: "circular",
        name: "Circular",
        description: "Equally spaced on the inscribed circle, in insertion order",
        default_options: &[],
        preconditions: &[],
    },
    Descriptor {
        id: "force-directed",
        name: "Force-directed",
        description: "Fruchterman-Reingold with linear cooling and frame clamping",
        default_options: &[("iterations", "50"), ("k", "sqrt(area/n)")],
        preconditions: &[],
    },
    Descriptor {
        id: "kamada-kawai",
        name: "Kamada-Kawai",
        description: "Stress minimisation against shortest-path ideal distances",
        default_options: &[("iterations", "300")],
        preconditions: &[],
    },
    Descriptor {
        id: "multipartite",
        name: "Multipartite",
        description: "Parallel axes for an externally supplied group property",
        default_options: &[("align", "vertical")],
        preconditions: &["group assignment required"],
    },
    Descriptor {
        id: "random",
        name: "Random",
        description: "Uniform in the padded rectangle, seeded",
        default_options: &[],
        preconditions: &[],
    },
    Descriptor {
        id: "shell",
        name: "Shell",
        description: "Concentric circles grouped by partition or degree buckets",
        default_options: &[("groups", "degree buckets")],
        preconditions: &[],
    },
    Descriptor {
        id: "spectral",
        name: "Spectral",
        description: "Fiedler and next Laplacian eigenvectors rescaled to the frame",
        default_options: &[],
        preconditions: &["Laplacian eigenvectors (computed transparently when absent)"],
    },
    Descriptor {
        id: "spiral",
        name: "Spiral",
        description: "Archimedean spiral with configurable resolution",
        default_options: &[("resolution", "0.35")],
        preconditions: &[],
    },
];

/// Community-algorithm catalogue, alphabetical by id.
pub const COMMUNITY_ALGORITHMS: [Descriptor; 1] = [Descriptor {
    id: "louvain",
    name: "Louvain",
    description: "Modularity-optimising hierarchical partitioning",
    default_options: &[("resolution", "1.0"), ("maxIter", "100")],
    preconditions: &[],
}];

/// Feature catalogue, alphabetical by id.
pub const FEATURES: [Descriptor; 7] = [
    Descriptor {
        id: "betweenness",
        name: "Betweenness centrality",
        description: "Brandes shortest-path accumulation, normalised to [0, 1]",
        default_options: &[],
        preconditions: &[],
    },
    Descriptor {
        id: "cliques",
        name: "Maximal-clique count",
        description: "Bron-Kerbosch enumeration with pivoting, per-node membership",
        default_options: &[],
        preconditions: &[],
    },
    Descriptor {
        id: "clustering",
        name: "Local clustering coefficient",
        description: "Density of each node's neighbourhood",
        default_options: &[],
        preconditions: &[],
    },
    Descriptor {
        id: "degree",
        name: "Degree",
        description: "Unweighted incidence count",
        default_options: &[],
        preconditions: &[],
    },
    Descriptor {
        id: "eigenvector",
        name: "Eigenvector centrality",
        description: "Power iteration on the weighted adjacency matrix",
        default_options: &[("maxIter", "100000"), ("tol", "1e-6")],
        preconditions: &[],
    },
    Descriptor {
        id: "eigenvector-laplacian",
        name: "Laplacian eigenvectors",
        description: "Fiedler and next eigenvectors via Jacobi rotation",
        default_options: &[],
        preconditions: &["node count within the dense-solver ceiling"],
    },
    Descriptor {
        id: "modularity",
        name: "Louvain communities",
        description: "Community id per node from modularity optimisation",
        default_options: &[("resolution", "1.0"), ("maxIter", "100")],
        preconditions: &[],
    },
];

/// Looks up a layout descriptor by id.
pub fn lookup_layout(id: &str) -> Option<&'static Descriptor> {
    LAYOUTS.iter().find(|d| d.id == id)
}

/// Looks up a community-algorithm descriptor by id.
pub fn lookup_community_algorithm(id: &str) -> Option<&'static Descriptor> {
    COMMUNITY_ALGORITHMS.iter().find(|d| d.id == id)
}

/// Looks up a feature descriptor by id.
pub fn lookup_feature(id: &str) -> Option<&'static Descriptor> {
    FEATURES.iter().find(|d| d.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogues_are_alphabetical() {
        for catalogue in [&LAYOUTS[..], &COMMUNITY_ALGORITHMS[..], &FEATURES[..]] {
            let ids: Vec<&str> = catalogue.iter().map(|d| d.id).collect();
            let mut sorted = ids.clone();
            sorted.sort_unstable();
            assert_eq!(ids, sorted);
        }
    }

    #[test]
    fn test_feature_ids_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(Feature::parse(feature.as_str()).unwrap(), feature);
            assert!(lookup_feature(feature.as_str()).is_some());
        }
        assert!(Feature::parse("pagerank").is_err());
    }

    #[test]
    fn test_layout_lookup() {
        assert!(lookup_layout("kamada-kawai").is_some());
        assert!(lookup_layout("treemap").is_none());
        assert!(lookup_community_algorithm("louvain").is_some());
    }
}
