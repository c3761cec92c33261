//! Community detection by modularity optimization.
//!
//! Given a weighted graph, find groups of nodes that are densely connected
//! inside and sparsely connected to each other.
//!
//! ## The Modularity Objective
//!
//! ```text
//! Q = (1/2m) × Σ[A_ij - γ(k_i × k_j)/(2m)] × δ(c_i, c_j)
//! ```
//!
//! Where:
//! - m = total edge weight (sum of all edges)
//! - A_ij = edge weight between i and j
//! - k_i = weighted degree of node i
//! - γ = resolution parameter
//! - δ(c_i, c_j) = 1 if i and j are in same community
//!
//! A good partition has Q > 0: more weight inside communities than a random
//! graph with the same degrees would put there.
//!
//! ## Pipeline
//!
//! ```text
//! Graph ─(optional MetricWeighting)─> Graph ─> LocalMoving ─> aggregate ─┐
//!                                                ^                        │
//!                                                └────── coarse graph ────┘
//! ```
//!
//! [`Louvain`] drives the loop and records each level in a [`Dendrogram`].
//! [`MetricLouvain`] adds the feature-distance reweighting step in front of it.
//!
//! ## Usage
//!
//! ```rust
//! use metric_louvain::community::{Features, LouvainOptions};
//! use metric_louvain::{metric_louvain, Graph};
//!
//! let graph = Graph::from_edges(
//!     4,
//!     [(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 0, 1.0)],
//! )
//! .unwrap();
//! let layout = Features::from_rows(&[
//!     vec![0.0, 0.0],
//!     vec![0.0, 0.1],
//!     vec![5.0, 0.1],
//!     vec![5.0, 0.0],
//! ])
//! .unwrap();
//!
//! let labels = metric_louvain(&graph, &layout, &LouvainOptions::default()).unwrap();
//! assert_eq!(labels, vec![0, 0, 1, 1]);
//! ```
//!
//! ## References
//!
//! - Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! - Newman & Girvan (2004). "Finding and evaluating community structure in networks."

pub mod aggregate;
mod dendrogram;
pub mod local_moving;
mod louvain;
pub mod metric;
pub mod modularity;
mod traits;

pub use aggregate::{aggregate, renumber, Aggregation};
pub use dendrogram::Dendrogram;
pub use local_moving::{LocalMoving, SweepReport, SweepStrategy};
pub use louvain::{louvain, metric_louvain, Louvain, LouvainOptions, LouvainResult, MetricLouvain};
pub use metric::{DistanceKernel, Features, MetricWeighting};
pub use modularity::{modularity, CommunityState, Modularity, NeighborLinks};
pub use traits::CommunityDetection;
