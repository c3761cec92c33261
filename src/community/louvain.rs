//! Louvain algorithm for community detection.
//!
//! Fast modularity optimization through local node moves and graph aggregation.
//!
//! ## The Algorithm (Blondel et al. 2008)
//!
//! 1. **Local moving**: start with each node in its own community and move
//!    nodes greedily to the neighboring community with the highest gain
//!    until no move helps ([`LocalMoving`]).
//! 2. **Aggregation**: collapse every community into a node; inter-community
//!    weights are summed, internal weight becomes a self-loop
//!    ([`aggregate`]).
//! 3. **Iterate** on the coarse graph while modularity improves by at least
//!    `epsilon`.
//!
//! The per-level partitions are kept in a [`Dendrogram`]; the final labels
//! are their composition.
//!
//! ## Metric variant
//!
//! [`MetricLouvain`] rescales edge weights by feature distance once, before
//! level 0 (see [`MetricWeighting`]), then runs the same driver. Nothing
//! downstream knows which variant produced the graph.
//!
//! ## Determinism
//!
//! Nodes are visited in index order and ties keep the current community, so
//! identical input and options always give identical partitions.
//!
//! ## References
//!
//! Blondel et al. (2008). "Fast unfolding of communities in large networks."
//! Journal of Statistical Mechanics: Theory and Experiment, P10008.

use std::borrow::Cow;

use log::{debug, info};

use super::aggregate::{aggregate, renumber, Aggregation};
use super::dendrogram::Dendrogram;
use super::local_moving::{LocalMoving, SweepStrategy};
use super::metric::{DistanceKernel, Features, MetricWeighting};
use super::modularity::{CommunityState, Modularity, NeighborLinks};
use super::traits::CommunityDetection;
use crate::error::{Error, Result};
use crate::graph::Graph;

/// Louvain community detection algorithm.
#[derive(Debug, Clone)]
pub struct Louvain {
    /// Resolution parameter (gamma).
    resolution: f64,
    /// Minimum modularity improvement, per sweep and per level.
    epsilon: f64,
    /// Maximum levels of aggregation; `None` runs to convergence.
    max_levels: Option<usize>,
    /// Maximum sweeps per level.
    max_sweeps: usize,
    strategy: SweepStrategy,
}

/// Outcome of a Louvain run.
#[derive(Debug, Clone, PartialEq)]
pub struct LouvainResult {
    /// Community of every original node, dense from 0 in order of first appearance.
    pub partition: Vec<usize>,
    /// Modularity of `partition`.
    pub modularity: f64,
    /// Per-level partitions.
    pub dendrogram: Dendrogram,
}

impl LouvainResult {
    /// Number of communities in the final partition.
    pub fn n_communities(&self) -> usize {
        self.partition.iter().copied().max().map_or(0, |c| c + 1)
    }
}

impl Louvain {
    /// Create a new Louvain detector with default settings.
    pub fn new() -> Self {
        Self {
            resolution: 1.0,
            epsilon: 1e-7,
            max_levels: None,
            max_sweeps: 1000,
            strategy: SweepStrategy::Sweep,
        }
    }

    /// Set resolution parameter.
    ///
    /// Higher values produce smaller communities.
    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the convergence threshold on modularity improvement.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Cap the number of levels. The run stops early and returns the best partition so far.
    pub fn with_max_levels(mut self, levels: usize) -> Self {
        self.max_levels = Some(levels);
        self
    }

    /// Set maximum sweeps per level.
    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    /// Set the local moving strategy.
    pub fn with_strategy(mut self, strategy: SweepStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Convergence threshold.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Level cap, if any.
    pub fn max_levels(&self) -> Option<usize> {
        self.max_levels
    }

    fn validate(&self) -> Result<()> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(Error::InvalidParameter {
                name: "resolution",
                message: "must be finite and positive",
            });
        }
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return Err(Error::InvalidParameter {
                name: "convergence_epsilon",
                message: "must be finite and non-negative",
            });
        }
        Ok(())
    }

    fn objective(&self) -> Modularity {
        Modularity::new().with_resolution(self.resolution)
    }

    fn local_moving(&self) -> LocalMoving {
        LocalMoving::new()
            .with_modularity(self.objective())
            .with_epsilon(self.epsilon)
            .with_max_sweeps(self.max_sweeps)
            .with_strategy(self.strategy)
    }

    /// Run multi-level Louvain on `graph`.
    pub fn run(&self, graph: &Graph) -> Result<LouvainResult> {
        let (dendrogram, _top, modularity) = self.run_levels(graph)?;
        let partition = dendrogram.flatten();
        let result = LouvainResult {
            partition,
            modularity,
            dendrogram,
        };
        info!(
            "louvain: {} nodes -> {} communities in {} levels, modularity {:.6}",
            graph.node_count(),
            result.n_communities(),
            result.dendrogram.n_levels(),
            result.modularity
        );
        Ok(result)
    }

    /// Optimize and aggregate until convergence or the level cap.
    ///
    /// Returns the hierarchy, the graph whose nodes are the final
    /// communities, and the final modularity.
    fn run_levels(&self, graph: &Graph) -> Result<(Dendrogram, Graph, f64)> {
        self.validate()?;

        let local = self.local_moving();
        let mut dendrogram = Dendrogram::new(graph.node_count());
        let mut current: Cow<'_, Graph> = Cow::Borrowed(graph);
        let mut best = CommunityState::singletons(graph).modularity(graph.total_weight(), self.resolution);

        loop {
            if self.max_levels.is_some_and(|cap| dendrogram.n_levels() >= cap) {
                debug!("level cap reached after {} levels", dendrogram.n_levels());
                break;
            }

            let level = dendrogram.n_levels();
            let mut state = CommunityState::singletons(&current);
            let report = local.optimize(&current, &mut state);
            let q = state.modularity(current.total_weight(), self.resolution);

            if level > 0 && q - best < self.epsilon {
                debug!(
                    "level {level}: modularity {q:.6} improves on {best:.6} by less than {:e}, stopping",
                    self.epsilon
                );
                break;
            }

            let (partition, n_communities) = renumber(state.assignment());
            debug!(
                "level {level}: {} nodes -> {} communities, modularity {q:.6} ({} sweeps, {} moves)",
                current.node_count(),
                n_communities,
                report.sweeps,
                report.moves
            );
            best = q;

            match aggregate(&current, &partition)? {
                Aggregation::Converged => {
                    dendrogram.push_level(partition, q)?;
                    break;
                }
                Aggregation::Coarsened { graph: next, .. } => {
                    dendrogram.push_level(partition, q)?;
                    current = Cow::Owned(next);
                }
            }
        }

        Ok((dendrogram, current.into_owned(), best))
    }

    /// Hierarchy that continues past the modularity optimum down to one
    /// community per connected component.
    ///
    /// After regular convergence, each further level applies only the single
    /// merge with the highest gain (which may be negative), so modularity
    /// generally decreases across the extra levels.
    pub fn full_dendrogram(&self, graph: &Graph) -> Result<Dendrogram> {
        let (mut dendrogram, mut top, mut q) = self.run_levels(graph)?;
        let objective = self.objective();

        loop {
            let mut state = CommunityState::singletons(&top);
            let mut links = NeighborLinks::new(top.node_count());

            // (node, target, gain) of the best merge; ties keep the earliest.
            let mut best: Option<(usize, usize, f64)> = None;
            for node in 0..top.node_count() {
                links.collect(&top, &state, node);
                let current = state.community_of(node);
                for &target in links.communities() {
                    let gain = objective.gain(&top, &state, &links, node, target, current);
                    if best.map_or(true, |(_, _, g)| gain > g) {
                        best = Some((node, target, gain));
                    }
                }
            }

            let Some((node, target, gain)) = best else {
                break;
            };
            links.collect(&top, &state, node);
            state.move_node(&top, &links, node, target);
            q += gain;

            let Aggregation::Coarsened { graph: next, partition } = aggregate(&top, state.assignment())? else {
                break;
            };
            debug!(
                "merge level {}: {} nodes, modularity {q:.6}",
                dendrogram.n_levels(),
                next.node_count()
            );
            dendrogram.push_level(partition, q)?;
            top = next;
        }

        Ok(dendrogram)
    }
}

impl Default for Louvain {
    fn default() -> Self {
        Self::new()
    }
}

impl CommunityDetection for Louvain {
    fn detect_graph(&self, graph: &Graph) -> Result<Vec<usize>> {
        Ok(self.run(graph)?.partition)
    }

    fn resolution(&self) -> f64 {
        self.resolution
    }
}

/// Louvain on feature-distance-weighted edges.
#[derive(Debug, Clone)]
pub struct MetricLouvain {
    louvain: Louvain,
    weighting: MetricWeighting,
    features: Features,
}

impl MetricLouvain {
    /// Default Louvain with exponential distance decay, scale 1.
    pub fn new(features: Features) -> Self {
        Self {
            louvain: Louvain::new(),
            weighting: MetricWeighting::new(),
            features,
        }
    }

    /// Set the underlying Louvain settings.
    pub fn with_louvain(mut self, louvain: Louvain) -> Self {
        self.louvain = louvain;
        self
    }

    /// Set the edge weighting.
    pub fn with_weighting(mut self, weighting: MetricWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Node features.
    pub fn features(&self) -> &Features {
        &self.features
    }

    /// `graph` with distance-adjusted weights, as seen by level 0.
    pub fn weighted_graph(&self, graph: &Graph) -> Result<Graph> {
        self.weighting.apply(graph, &self.features)
    }

    /// Reweight `graph` and run Louvain on the result.
    ///
    /// The reported modularity is measured on the reweighted graph.
    pub fn run(&self, graph: &Graph) -> Result<LouvainResult> {
        let weighted = self.weighted_graph(graph)?;
        debug!(
            "metric weighting: total weight {:.6} -> {:.6}",
            graph.total_weight(),
            weighted.total_weight()
        );
        self.louvain.run(&weighted)
    }
}

impl CommunityDetection for MetricLouvain {
    fn detect_graph(&self, graph: &Graph) -> Result<Vec<usize>> {
        Ok(self.run(graph)?.partition)
    }

    fn resolution(&self) -> f64 {
        self.louvain.resolution
    }
}

/// Options for [`metric_louvain`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LouvainOptions {
    /// Distance scale of the weighting kernel.
    pub distance_scale: f64,
    /// Minimum modularity improvement to keep sweeping or aggregating.
    pub convergence_epsilon: f64,
    /// Level cap; `None` runs to convergence.
    pub max_levels: Option<usize>,
    /// Resolution parameter (gamma).
    pub resolution: f64,
    /// Distance kernel.
    pub kernel: DistanceKernel,
}

impl Default for LouvainOptions {
    fn default() -> Self {
        Self {
            distance_scale: 1.0,
            convergence_epsilon: 1e-7,
            max_levels: None,
            resolution: 1.0,
            kernel: DistanceKernel::Exponential,
        }
    }
}

impl LouvainOptions {
    /// Driver configured from these options.
    pub fn louvain(&self) -> Louvain {
        let louvain = Louvain::new()
            .with_resolution(self.resolution)
            .with_epsilon(self.convergence_epsilon);
        match self.max_levels {
            Some(levels) => louvain.with_max_levels(levels),
            None => louvain,
        }
    }

    /// Edge weighting configured from these options.
    pub fn weighting(&self) -> MetricWeighting {
        MetricWeighting::new()
            .with_scale(self.distance_scale)
            .with_kernel(self.kernel)
    }
}

/// Communities of `graph` with default settings.
///
/// ```rust
/// use metric_louvain::{louvain, Graph};
///
/// let graph = Graph::from_edges(4, [(0, 1, 1.0), (2, 3, 1.0)]).unwrap();
/// assert_eq!(louvain(&graph).unwrap(), vec![0, 0, 1, 1]);
/// ```
pub fn louvain(graph: &Graph) -> Result<Vec<usize>> {
    Louvain::new().detect_graph(graph)
}

/// Communities of `graph` after reweighting its edges by feature distance.
///
/// # Errors
///
/// - [`Error::FeatureCountMismatch`] if `features` does not have one row per node
/// - [`Error::InvalidParameter`] for a non-positive distance scale or resolution
pub fn metric_louvain(
    graph: &Graph,
    features: &Features,
    options: &LouvainOptions,
) -> Result<Vec<usize>> {
    let weighted = options.weighting().apply(graph, features)?;
    options.louvain().detect_graph(&weighted)
}
