//! Compact weighted graph storage.
//!
//! [`Graph`] is an immutable, undirected, weighted graph in compressed
//! sparse row (CSR) layout: one offsets array, one neighbor array, one
//! weight array. Self-loops live in a separate per-node array so that
//! neighbor iteration never has to filter them out.
//!
//! ## Weight conventions
//!
//! ```text
//! m   = Σ w(u,v) over undirected edges + Σ loop(u)
//! k_u = Σ w(u,v) over v != u           + 2 · loop(u)
//! ```
//!
//! so `Σ k_u = 2m`. Aggregated graphs store a community's internal weight
//! as a self-loop, which keeps both `m` and the community degree unchanged.

use crate::error::{Error, Result};
use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;

/// Conversion from a petgraph edge payload into a numeric weight.
///
/// Unweighted graphs (`()`) count every edge as `1.0`.
pub trait EdgeWeight {
    /// Weight of the edge.
    fn weight(&self) -> f64;
}

impl EdgeWeight for () {
    fn weight(&self) -> f64 {
        1.0
    }
}

impl EdgeWeight for f64 {
    fn weight(&self) -> f64 {
        *self
    }
}

impl EdgeWeight for f32 {
    fn weight(&self) -> f64 {
        f64::from(*self)
    }
}

impl EdgeWeight for u32 {
    fn weight(&self) -> f64 {
        f64::from(*self)
    }
}

impl EdgeWeight for usize {
    fn weight(&self) -> f64 {
        *self as f64
    }
}

/// Undirected weighted graph with dense node indices `0..n`.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    /// `offsets[u]..offsets[u + 1]` indexes the neighbors of `u`.
    offsets: Vec<usize>,
    targets: Vec<usize>,
    weights: Vec<f64>,
    self_loops: Vec<f64>,
    degrees: Vec<f64>,
    total_weight: f64,
}

impl Graph {
    /// Build a graph from an edge list.
    ///
    /// Parallel edges, in either orientation, are summed. Edges whose summed
    /// weight is zero are dropped.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyGraph`] if `n == 0`
    /// - [`Error::NodeOutOfBounds`] if an endpoint is `>= n`
    /// - [`Error::InvalidWeight`] if a weight, or the sum of parallel edges, is negative or not finite
    /// - [`Error::InvalidParameter`] if twice the total weight is not finite
    pub fn from_edges<I>(n: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        if n == 0 {
            return Err(Error::EmptyGraph);
        }

        let mut normalized: Vec<(usize, usize, f64)> = Vec::new();
        for (u, v, w) in edges {
            for node in [u, v] {
                if node >= n {
                    return Err(Error::NodeOutOfBounds {
                        node,
                        node_count: n,
                    });
                }
            }
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidWeight {
                    source: u,
                    target: v,
                    weight: w,
                });
            }
            normalized.push(if u <= v { (u, v, w) } else { (v, u, w) });
        }

        // Stable sort keeps the summation order of duplicates reproducible.
        normalized.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut merged: Vec<(usize, usize, f64)> = Vec::with_capacity(normalized.len());
        for (u, v, w) in normalized {
            match merged.last_mut() {
                Some(last) if last.0 == u && last.1 == v => last.2 += w,
                _ => merged.push((u, v, w)),
            }
        }
        merged.retain(|&(_, _, w)| w > 0.0);

        // Finite inputs can still overflow once summed.
        if let Some(&(u, v, w)) = merged.iter().find(|(_, _, w)| !w.is_finite()) {
            return Err(Error::InvalidWeight {
                source: u,
                target: v,
                weight: w,
            });
        }
        let total: f64 = merged.iter().map(|&(_, _, w)| w).sum();
        if !(2.0 * total).is_finite() {
            return Err(Error::InvalidParameter {
                name: "edge weights",
                message: "total weight overflows",
            });
        }

        Ok(Self::from_sorted_edges(n, &merged))
    }

    /// Build a graph from a petgraph undirected graph.
    ///
    /// Node indices are taken from petgraph's `NodeIndex::index()`.
    pub fn from_petgraph<N, E: EdgeWeight>(graph: &UnGraph<N, E>) -> Result<Self> {
        let edges = graph.edge_references().map(|e| {
            (
                e.source().index(),
                e.target().index(),
                e.weight().weight(),
            )
        });
        Self::from_edges(graph.node_count(), edges)
    }

    /// `edges` must be sorted by `(u, v)`, deduplicated, with `u <= v` and `w > 0`.
    fn from_sorted_edges(n: usize, edges: &[(usize, usize, f64)]) -> Self {
        let mut counts = vec![0usize; n];
        let mut self_loops = vec![0.0; n];
        let mut degrees = vec![0.0; n];
        let mut total_weight = 0.0;

        for &(u, v, w) in edges {
            total_weight += w;
            if u == v {
                self_loops[u] += w;
                degrees[u] += 2.0 * w;
            } else {
                counts[u] += 1;
                counts[v] += 1;
                degrees[u] += w;
                degrees[v] += w;
            }
        }

        let mut offsets = Vec::with_capacity(n + 1);
        offsets.push(0);
        for &c in &counts {
            let last = offsets[offsets.len() - 1];
            offsets.push(last + c);
        }

        let nnz = offsets[n];
        let mut targets = vec![0usize; nnz];
        let mut weights = vec![0.0; nnz];
        let mut cursor = offsets[..n].to_vec();

        // Sorted input fills every row in ascending neighbor order: first the
        // smaller endpoints (as `v`), then the larger ones (as `u`).
        for &(u, v, w) in edges {
            if u == v {
                continue;
            }
            targets[cursor[u]] = v;
            weights[cursor[u]] = w;
            cursor[u] += 1;
            targets[cursor[v]] = u;
            weights[cursor[v]] = w;
            cursor[v] += 1;
        }

        Self {
            offsets,
            targets,
            weights,
            self_loops,
            degrees,
            total_weight,
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.self_loops.len()
    }

    /// Number of distinct edges, counting each undirected edge and each self-loop once.
    pub fn edge_count(&self) -> usize {
        self.targets.len() / 2 + self.self_loops.iter().filter(|&&w| w > 0.0).count()
    }

    /// Neighbors of `node` with edge weights, in ascending neighbor order.
    ///
    /// The node's own self-loop is not included; see [`Graph::self_loop`].
    ///
    /// # Panics
    ///
    /// Panics if `node >= node_count()`.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.offsets[node]..self.offsets[node + 1];
        self.targets[range.clone()]
            .iter()
            .copied()
            .zip(self.weights[range].iter().copied())
    }

    /// Number of distinct non-loop neighbors of `node`.
    pub fn neighbor_count(&self, node: usize) -> usize {
        self.offsets[node + 1] - self.offsets[node]
    }

    /// Self-loop weight of `node` (zero if none).
    pub fn self_loop(&self, node: usize) -> f64 {
        self.self_loops[node]
    }

    /// Weighted degree of `node`; self-loops count twice.
    pub fn degree(&self, node: usize) -> f64 {
        self.degrees[node]
    }

    /// Weighted degrees of all nodes.
    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    /// Total edge weight `m`.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Every undirected edge once as `(u, v, w)` with `u <= v`, self-loops included.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.node_count()).flat_map(move |u| {
            let lp = self.self_loops[u];
            let self_loop = (lp > 0.0).then_some((u, u, lp));
            self_loop.into_iter().chain(
                self.neighbors(u)
                    .filter(move |&(v, _)| v > u)
                    .map(move |(v, w)| (u, v, w)),
            )
        })
    }
}
