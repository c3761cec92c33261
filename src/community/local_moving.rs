//! Phase 1 of Louvain: greedy local moving.
//!
//! Nodes are visited in index order. Each node is moved to the neighboring
//! community with the strictly largest positive modularity gain; if no move
//! gains anything, it stays. Moves are applied immediately, so later nodes in
//! the same sweep see the updated state.
//!
//! Two visiting strategies are available:
//!
//! - [`SweepStrategy::Sweep`]: full passes over `0..n` until a pass moves
//!   nothing or gains less than `epsilon`.
//! - [`SweepStrategy::Prune`]: a FIFO work queue seeded with every node;
//!   when a node moves, only its neighbors outside the new community are
//!   revisited. Usually far fewer evaluations on large sparse graphs.

use std::collections::VecDeque;

use log::trace;

use super::modularity::{CommunityState, Modularity, NeighborLinks};
use crate::graph::Graph;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Below this many candidate communities, gains are evaluated sequentially.
#[cfg(feature = "parallel")]
const PARALLEL_MIN_CANDIDATES: usize = 256;

/// How nodes are scheduled for re-evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepStrategy {
    /// Repeated full passes in node index order.
    #[default]
    Sweep,
    /// Work queue of nodes whose neighborhood changed.
    Prune,
}

/// Statistics from one local moving phase.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SweepReport {
    /// Full passes (for [`SweepStrategy::Prune`], visits divided by node count, rounded up).
    pub sweeps: usize,
    /// Node evaluations.
    pub visits: usize,
    /// Nodes that changed community.
    pub moves: usize,
    /// Summed modularity gain of all applied moves.
    pub gain: f64,
}

/// Greedy local moving phase.
#[derive(Debug, Clone)]
pub struct LocalMoving {
    modularity: Modularity,
    /// Minimum summed gain of a sweep to run another one.
    epsilon: f64,
    /// Maximum full passes (or `max_sweeps × n` queue visits).
    max_sweeps: usize,
    strategy: SweepStrategy,
}

impl LocalMoving {
    /// Create a local moving phase with default settings.
    pub fn new() -> Self {
        Self {
            modularity: Modularity::new(),
            epsilon: 1e-7,
            max_sweeps: 1000,
            strategy: SweepStrategy::Sweep,
        }
    }

    /// Set the modularity objective.
    pub fn with_modularity(mut self, modularity: Modularity) -> Self {
        self.modularity = modularity;
        self
    }

    /// Set convergence threshold on the gain of one sweep.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set maximum number of sweeps.
    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    /// Set the visiting strategy.
    pub fn with_strategy(mut self, strategy: SweepStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Move nodes of `graph` between communities of `state` until a local optimum.
    pub fn optimize(&self, graph: &Graph, state: &mut CommunityState) -> SweepReport {
        let mut links = NeighborLinks::new(graph.node_count());
        match self.strategy {
            SweepStrategy::Sweep => self.sweep(graph, state, &mut links),
            SweepStrategy::Prune => self.prune(graph, state, &mut links),
        }
    }

    fn sweep(
        &self,
        graph: &Graph,
        state: &mut CommunityState,
        links: &mut NeighborLinks,
    ) -> SweepReport {
        let mut report = SweepReport::default();

        while report.sweeps < self.max_sweeps {
            report.sweeps += 1;
            let mut moves = 0;
            let mut gain = 0.0;

            for node in 0..graph.node_count() {
                links.collect(graph, state, node);
                report.visits += 1;
                if let Some((target, g)) = self.best_move(graph, state, links, node) {
                    state.move_node(graph, links, node, target);
                    moves += 1;
                    gain += g;
                }
            }

            report.moves += moves;
            report.gain += gain;
            trace!(
                "sweep {}: {} moves, gain {:.3e}",
                report.sweeps,
                moves,
                gain
            );

            if moves == 0 || gain < self.epsilon {
                break;
            }
        }

        report
    }

    fn prune(
        &self,
        graph: &Graph,
        state: &mut CommunityState,
        links: &mut NeighborLinks,
    ) -> SweepReport {
        let n = graph.node_count();
        let mut report = SweepReport::default();
        let budget = self.max_sweeps.saturating_mul(n);

        let mut queue: VecDeque<usize> = (0..n).collect();
        let mut in_queue = vec![true; n];

        while let Some(node) = queue.pop_front() {
            if report.visits >= budget {
                break;
            }
            in_queue[node] = false;
            report.visits += 1;

            links.collect(graph, state, node);
            let Some((target, g)) = self.best_move(graph, state, links, node) else {
                continue;
            };
            state.move_node(graph, links, node, target);
            report.moves += 1;
            report.gain += g;

            for (neighbor, _) in graph.neighbors(node) {
                if !in_queue[neighbor] && state.community_of(neighbor) != target {
                    queue.push_back(neighbor);
                    in_queue[neighbor] = true;
                }
            }
        }

        report.sweeps = report.visits.div_ceil(n.max(1));
        trace!(
            "pruned moving: {} visits, {} moves, gain {:.3e}",
            report.visits,
            report.moves,
            report.gain
        );
        report
    }

    /// Best community for `node` if it strictly improves on staying.
    ///
    /// Among equal gains the candidate seen first (lowest neighbor index) wins.
    fn best_move(
        &self,
        graph: &Graph,
        state: &CommunityState,
        links: &NeighborLinks,
        node: usize,
    ) -> Option<(usize, f64)> {
        let current = state.community_of(node);
        let candidates = links.communities();

        #[cfg(feature = "parallel")]
        if candidates.len() >= PARALLEL_MIN_CANDIDATES {
            return candidates
                .par_iter()
                .enumerate()
                .filter(|&(_, &c)| c != current)
                .map(|(i, &c)| {
                    let g = self.modularity.gain(graph, state, links, node, c, current);
                    (i, c, g)
                })
                .reduce_with(|a, b| {
                    if b.2 > a.2 || (b.2 == a.2 && b.0 < a.0) {
                        b
                    } else {
                        a
                    }
                })
                .filter(|&(_, _, g)| g > 0.0)
                .map(|(_, c, g)| (c, g));
        }

        let mut best: Option<(usize, f64)> = None;
        let mut best_gain = 0.0;
        for &c in candidates {
            if c == current {
                continue;
            }
            let g = self.modularity.gain(graph, state, links, node, c, current);
            if g > best_gain {
                best_gain = g;
                best = Some((c, g));
            }
        }
        best
    }
}

impl Default for LocalMoving {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::community::modularity::modularity;

    fn two_cliques() -> Graph {
        let mut edges = Vec::new();
        for base in [0, 4] {
            for i in 0..4 {
                for j in (i + 1)..4 {
                    edges.push((base + i, base + j, 1.0));
                }
            }
        }
        edges.push((3, 4, 1.0));
        Graph::from_edges(8, edges).unwrap()
    }

    /// Hub 0 joined to leaves `1..=300`. Leaves 1..=10 and every third leaf
    /// also touch sink 301, which lowers their gain for the hub.
    fn wide_hub() -> Graph {
        let mut edges = Vec::new();
        for leaf in 1..=300 {
            edges.push((0, leaf, 1.0));
            if leaf <= 10 || leaf % 3 == 0 {
                edges.push((leaf, 301, 1.0));
            }
        }
        Graph::from_edges(302, edges).unwrap()
    }

    /// Reference scan: largest gain, earliest candidate on ties.
    fn first_best(
        g: &Graph,
        state: &CommunityState,
        links: &NeighborLinks,
        node: usize,
    ) -> Option<(usize, f64)> {
        let objective = Modularity::new();
        let current = state.community_of(node);
        let mut best: Option<(usize, f64)> = None;
        for &c in links.communities() {
            let gain = objective.gain(g, state, links, node, c, current);
            if gain > best.map_or(0.0, |(_, b)| b) {
                best = Some((c, gain));
            }
        }
        best
    }

    #[test]
    fn wide_hub_takes_first_of_tied_communities() {
        let g = wide_hub();
        let state = CommunityState::singletons(&g);
        let mut links = NeighborLinks::new(g.node_count());
        links.collect(&g, &state, 0);
        assert_eq!(links.communities().len(), 300);

        let chosen = LocalMoving::new().best_move(&g, &state, &links, 0);
        assert_eq!(chosen.map(|(c, _)| c), Some(11));
        assert_eq!(chosen, first_best(&g, &state, &links, 0));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_scoring_matches_sequential_rule() {
        let g = wide_hub();
        let state = CommunityState::singletons(&g);
        let mut links = NeighborLinks::new(g.node_count());
        links.collect(&g, &state, 0);
        assert!(links.communities().len() >= PARALLEL_MIN_CANDIDATES);

        for _ in 0..20 {
            let chosen = LocalMoving::new().best_move(&g, &state, &links, 0);
            assert_eq!(chosen, first_best(&g, &state, &links, 0));
        }
    }

    #[test]
    fn sweep_groups_cliques() {
        let g = two_cliques();
        let mut state = CommunityState::singletons(&g);
        let report = LocalMoving::new().optimize(&g, &mut state);

        let a = state.assignment();
        assert!(a[..4].iter().all(|&c| c == a[0]));
        assert!(a[4..].iter().all(|&c| c == a[4]));
        assert_ne!(a[0], a[4]);
        assert!(report.moves > 0);
        assert!(report.sweeps >= 2);
        assert_eq!(report.visits, report.sweeps * g.node_count());
    }

    #[test]
    fn reported_gain_matches_modularity_change() {
        let g = two_cliques();
        let mut state = CommunityState::singletons(&g);
        let before = modularity(&g, state.assignment(), 1.0).unwrap();
        let report = LocalMoving::new().optimize(&g, &mut state);
        let after = modularity(&g, state.assignment(), 1.0).unwrap();
        assert!((report.gain - (after - before)).abs() < 1e-9);
    }

    #[test]
    fn prune_reaches_same_grouping() {
        let g = two_cliques();
        let mut state = CommunityState::singletons(&g);
        let report = LocalMoving::new()
            .with_strategy(SweepStrategy::Prune)
            .optimize(&g, &mut state);

        let a = state.assignment();
        assert!(a[..4].iter().all(|&c| c == a[0]));
        assert!(a[4..].iter().all(|&c| c == a[4]));
        assert_ne!(a[0], a[4]);
        assert!(report.visits >= g.node_count());
    }

    #[test]
    fn no_edges_no_moves() {
        let g = Graph::from_edges(3, std::iter::empty()).unwrap();
        let mut state = CommunityState::singletons(&g);
        let report = LocalMoving::new().optimize(&g, &mut state);
        assert_eq!(report.moves, 0);
        assert_eq!(report.sweeps, 1);
        assert_eq!(state.assignment(), &[0, 1, 2]);
    }

    #[test]
    fn max_sweeps_bounds_work() {
        let g = two_cliques();
        let mut state = CommunityState::singletons(&g);
        let report = LocalMoving::new().with_max_sweeps(1).optimize(&g, &mut state);
        assert_eq!(report.sweeps, 1);
        assert_eq!(report.visits, g.node_count());
    }

    #[test]
    fn moves_never_decrease_modularity() {
        let g = two_cliques();
        for strategy in [SweepStrategy::Sweep, SweepStrategy::Prune] {
            let mut state = CommunityState::singletons(&g);
            let before = state.modularity(g.total_weight(), 1.0);
            let _ = LocalMoving::new()
                .with_strategy(strategy)
                .optimize(&g, &mut state);
            assert!(state.modularity(g.total_weight(), 1.0) >= before);
        }
    }
}
