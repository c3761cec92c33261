//! # metric-louvain
//!
//! Louvain community detection on weighted undirected graphs, with an
//! optional "metric" front stage that down-weights edges between nodes whose
//! feature vectors (for example a graph layout) are far apart.
//!
//! - [`Graph`]: compact, immutable weighted adjacency
//! - [`community::Louvain`]: multi-level modularity optimization
//! - [`community::MetricLouvain`]: the same, on distance-adjusted weights
//! - [`modularity`]: independent modularity score of any partition
//!
//! ```rust
//! use metric_louvain::{louvain, Graph};
//!
//! let graph = Graph::from_edges(
//!     6,
//!     [(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0), (3, 4, 1.0), (4, 5, 1.0), (3, 5, 1.0), (2, 3, 1.0)],
//! )
//! .unwrap();
//! assert_eq!(louvain(&graph).unwrap(), vec![0, 0, 0, 1, 1, 1]);
//! ```
//!
//! The `parallel` feature evaluates candidate gains and metric weights with
//! rayon; results are identical to the sequential build.

pub mod community;
/// Error types used across `metric_louvain`.
pub mod error;
pub mod graph;

#[cfg(test)]
mod louvain_tests;

pub use community::{
    louvain, metric_louvain, modularity, CommunityDetection, Dendrogram, DistanceKernel,
    Features, Louvain, LouvainOptions, LouvainResult, MetricLouvain, MetricWeighting,
};
pub use error::{Error, Result};
pub use graph::{EdgeWeight, Graph};
