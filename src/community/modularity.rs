//! Modularity, its incremental gain, and the per-level community state.
//!
//! For a partition into communities `c`:
//!
//! ```text
//! Q = Σ_c [ Σin(c) / m  -  γ · (Σtot(c) / 2m)² ]
//! ```
//!
//! where `Σin(c)` is the weight of edges inside `c` (each edge once,
//! self-loops once) and `Σtot(c)` is the summed weighted degree of its
//! members.
//!
//! Moving node `i` from community `C` (which contains `i`) to `D`:
//!
//! ```text
//! ΔQ = [k_i,in(D) - k_i,in(C)] / m  -  γ · k_i · [Σtot(D) - Σtot(C) + k_i] / 2m²
//! ```
//!
//! `k_i,in(X)` excludes the node's own self-loop, which moves with the node
//! and cancels out.

use std::collections::HashMap;

use super::aggregate::renumber;
use crate::error::{Error, Result};
use crate::graph::Graph;

/// Per-level community assignment with cached aggregates.
///
/// Community ids range over `0..node_count`; a community may be empty.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunityState {
    assignment: Vec<usize>,
    /// Σtot per community.
    totals: Vec<f64>,
    /// Σin per community.
    internals: Vec<f64>,
    sizes: Vec<usize>,
}

impl CommunityState {
    /// Every node in its own community.
    pub fn singletons(graph: &Graph) -> Self {
        let n = graph.node_count();
        Self {
            assignment: (0..n).collect(),
            totals: graph.degrees().to_vec(),
            internals: (0..n).map(|u| graph.self_loop(u)).collect(),
            sizes: vec![1; n],
        }
    }

    /// State for an arbitrary partition. Community ids are renumbered densely.
    pub fn from_partition(graph: &Graph, partition: &[usize]) -> Result<Self> {
        let n = graph.node_count();
        if partition.len() != n {
            return Err(Error::PartitionLengthMismatch {
                expected: n,
                found: partition.len(),
            });
        }

        let (assignment, _) = renumber(partition);
        let mut totals = vec![0.0; n];
        let mut internals = vec![0.0; n];
        let mut sizes = vec![0; n];

        for u in 0..n {
            let c = assignment[u];
            totals[c] += graph.degree(u);
            sizes[c] += 1;
        }
        for (u, v, w) in graph.edges() {
            if assignment[u] == assignment[v] {
                internals[assignment[u]] += w;
            }
        }

        Ok(Self {
            assignment,
            totals,
            internals,
            sizes,
        })
    }

    /// Community of `node`.
    pub fn community_of(&self, node: usize) -> usize {
        self.assignment[node]
    }

    /// Community of every node.
    pub fn assignment(&self) -> &[usize] {
        &self.assignment
    }

    /// Consume the state, keeping only the assignment.
    pub fn into_assignment(self) -> Vec<usize> {
        self.assignment
    }

    /// Σtot of `community`.
    pub fn total(&self, community: usize) -> f64 {
        self.totals[community]
    }

    /// Σin of `community`.
    pub fn internal(&self, community: usize) -> f64 {
        self.internals[community]
    }

    /// Number of members of `community`.
    pub fn size(&self, community: usize) -> usize {
        self.sizes[community]
    }

    /// Number of non-empty communities.
    pub fn n_communities(&self) -> usize {
        self.sizes.iter().filter(|&&s| s > 0).count()
    }

    /// Move `node` into `to`, updating aggregates.
    ///
    /// `links` must hold the tally collected for `node` against this state.
    pub fn move_node(&mut self, graph: &Graph, links: &NeighborLinks, node: usize, to: usize) {
        let from = self.assignment[node];
        if from == to {
            return;
        }
        let k = graph.degree(node);
        let lp = graph.self_loop(node);

        self.totals[from] -= k;
        self.internals[from] -= links.weight_to(from) + lp;
        self.sizes[from] -= 1;

        self.totals[to] += k;
        self.internals[to] += links.weight_to(to) + lp;
        self.sizes[to] += 1;

        self.assignment[node] = to;
    }

    /// Modularity from the cached aggregates, O(n).
    pub fn modularity(&self, total_weight: f64, resolution: f64) -> f64 {
        if total_weight == 0.0 {
            return 0.0;
        }
        let two_m = 2.0 * total_weight;
        self.sizes
            .iter()
            .enumerate()
            .filter(|(_, &s)| s > 0)
            .map(|(c, _)| {
                let tot = self.totals[c] / two_m;
                self.internals[c] / total_weight - resolution * tot * tot
            })
            .sum()
    }
}

/// Tally of edge weight from one node to each neighboring community.
///
/// Dense scratch buffer indexed by community id; only the touched entries
/// are reset between nodes, so collecting is O(deg(node)).
#[derive(Debug, Clone)]
pub struct NeighborLinks {
    weights: Vec<f64>,
    seen: Vec<bool>,
    /// Communities in first-seen order (neighbor index order).
    touched: Vec<usize>,
}

impl NeighborLinks {
    /// Scratch space for community ids in `0..n_communities`.
    pub fn new(n_communities: usize) -> Self {
        Self {
            weights: vec![0.0; n_communities],
            seen: vec![false; n_communities],
            touched: Vec::new(),
        }
    }

    /// Tally `k_i,in(C)` for every community `C` adjacent to `node`.
    pub fn collect(&mut self, graph: &Graph, state: &CommunityState, node: usize) {
        self.clear();
        for (neighbor, w) in graph.neighbors(node) {
            let c = state.community_of(neighbor);
            if !self.seen[c] {
                self.seen[c] = true;
                self.touched.push(c);
            }
            self.weights[c] += w;
        }
    }

    /// Edge weight from the collected node into `community` (zero if not adjacent).
    pub fn weight_to(&self, community: usize) -> f64 {
        self.weights[community]
    }

    /// Adjacent communities in first-seen order.
    pub fn communities(&self) -> &[usize] {
        &self.touched
    }

    fn clear(&mut self) {
        for &c in &self.touched {
            self.weights[c] = 0.0;
            self.seen[c] = false;
        }
        self.touched.clear();
    }
}

/// Modularity objective with a resolution parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Modularity {
    /// Resolution parameter (gamma).
    resolution: f64,
}

impl Modularity {
    /// Standard modularity (γ = 1).
    pub fn new() -> Self {
        Self { resolution: 1.0 }
    }

    /// Set resolution parameter. Higher values favor smaller communities.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Resolution parameter.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// ΔQ of moving `node` from `current` (its community) into `target`.
    ///
    /// Zero when `target == current` or the graph has no edge weight.
    pub fn gain(
        &self,
        graph: &Graph,
        state: &CommunityState,
        links: &NeighborLinks,
        node: usize,
        target: usize,
        current: usize,
    ) -> f64 {
        debug_assert_eq!(state.community_of(node), current);
        let m = graph.total_weight();
        if m == 0.0 || target == current {
            return 0.0;
        }
        let ki = graph.degree(node);
        let k_in = links.weight_to(target) - links.weight_to(current);
        let sigma = state.total(target) - state.total(current) + ki;
        k_in / m - self.resolution * ki * sigma / (2.0 * m * m)
    }
}

impl Default for Modularity {
    fn default() -> Self {
        Self::new()
    }
}

/// Modularity of `partition` on `graph`, computed from the edge list alone.
///
/// O(edges). Community ids may be arbitrary; only equality matters.
///
/// ```rust
/// use metric_louvain::{modularity, Graph};
///
/// let graph = Graph::from_edges(4, [(0, 1, 1.0), (2, 3, 1.0)]).unwrap();
/// let q = modularity(&graph, &[0, 0, 1, 1], 1.0).unwrap();
/// assert!((q - 0.5).abs() < 1e-12);
/// ```
pub fn modularity(graph: &Graph, partition: &[usize], resolution: f64) -> Result<f64> {
    let n = graph.node_count();
    if partition.len() != n {
        return Err(Error::PartitionLengthMismatch {
            expected: n,
            found: partition.len(),
        });
    }

    let m: f64 = graph.edges().map(|(_, _, w)| w).sum();
    if m == 0.0 {
        return Ok(0.0);
    }

    // community -> (Σin, Σtot)
    let mut stats: HashMap<usize, (f64, f64)> = HashMap::new();
    for (u, v, w) in graph.edges() {
        let (cu, cv) = (partition[u], partition[v]);
        if cu == cv {
            let entry = stats.entry(cu).or_insert((0.0, 0.0));
            entry.0 += w;
            entry.1 += 2.0 * w;
        } else {
            stats.entry(cu).or_insert((0.0, 0.0)).1 += w;
            stats.entry(cv).or_insert((0.0, 0.0)).1 += w;
        }
    }

    let two_m = 2.0 * m;
    Ok(stats
        .values()
        .map(|&(internal, total)| {
            let tot = total / two_m;
            internal / m - resolution * tot * tot
        })
        .sum())
}
