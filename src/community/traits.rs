//! Community detection traits.

use crate::error::Result;
use crate::graph::{EdgeWeight, Graph};
use petgraph::graph::UnGraph;

/// Trait for community detection algorithms.
///
/// Implementors only partition [`Graph`]; petgraph input goes through
/// [`Graph::from_petgraph`].
pub trait CommunityDetection {
    /// Community id of every node of `graph`, dense from 0.
    fn detect_graph(&self, graph: &Graph) -> Result<Vec<usize>>;

    /// Detect communities in a petgraph graph.
    ///
    /// Node `i` of the result is `NodeIndex::new(i)`. Edge payloads are read
    /// through [`EdgeWeight`], so `UnGraph<_, ()>` is unweighted.
    fn detect<N, E: EdgeWeight>(&self, graph: &UnGraph<N, E>) -> Result<Vec<usize>> {
        self.detect_graph(&Graph::from_petgraph(graph)?)
    }

    /// Resolution parameter of the objective.
    fn resolution(&self) -> f64 {
        1.0
    }
}
