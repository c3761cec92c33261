//! Graph aggregation: collapse each community into a single node.
//!
//! Edge weights between aggregated nodes are the summed weights between the
//! member sets; intra-community weight (edges and self-loops) becomes the
//! aggregated node's self-loop. Both the total weight `m` and each
//! community's degree are preserved, so modularity of the coarse singleton
//! partition equals modularity of the fine partition it came from.

use std::collections::HashMap;

use crate::error::Result;
use crate::graph::Graph;

/// Outcome of aggregating one level.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// Every community is a singleton; no further compression is possible.
    Converged,
    /// One node per non-empty community.
    Coarsened {
        /// The induced graph.
        graph: Graph,
        /// Fine node -> coarse node (dense community id).
        partition: Vec<usize>,
    },
}

/// Renumber community ids densely, in order of first appearance by node index.
///
/// Returns the relabeled assignment and the number of communities.
pub fn renumber(assignment: &[usize]) -> (Vec<usize>, usize) {
    let mut new_ids: HashMap<usize, usize> = HashMap::new();
    let relabeled = assignment
        .iter()
        .map(|&c| {
            let next = new_ids.len();
            *new_ids.entry(c).or_insert(next)
        })
        .collect();
    (relabeled, new_ids.len())
}

/// Build the induced graph of `assignment`.
///
/// Returns [`Aggregation::Converged`] when there are as many communities as nodes.
pub fn aggregate(graph: &Graph, assignment: &[usize]) -> Result<Aggregation> {
    let (partition, n_communities) = renumber(assignment);
    if n_communities == graph.node_count() {
        return Ok(Aggregation::Converged);
    }

    let edges = graph
        .edges()
        .map(|(u, v, w)| (partition[u], partition[v], w));
    let coarse = Graph::from_edges(n_communities, edges)?;

    Ok(Aggregation::Coarsened {
        graph: coarse,
        partition,
    })
}
