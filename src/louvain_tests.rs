#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::community::{
        aggregate, modularity, Aggregation, CommunityState, Features, LocalMoving, Louvain,
        LouvainOptions, Modularity, NeighborLinks, SweepStrategy,
    };
    use crate::{louvain, metric_louvain, Graph, Result};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Random weighted graph on `1..max_nodes` nodes; self-loops allowed.
    fn arb_graph(max_nodes: usize) -> impl Strategy<Value = Graph> {
        (1..max_nodes).prop_flat_map(|n| {
            proptest::collection::vec((0..n, 0..n, 0.1f64..5.0), 0..(3 * n))
                .prop_map(move |edges| Graph::from_edges(n, edges).unwrap())
        })
    }

    const STRATEGIES: [SweepStrategy; 2] = [SweepStrategy::Sweep, SweepStrategy::Prune];

    fn singleton_modularity(graph: &Graph) -> f64 {
        let singletons: Vec<usize> = (0..graph.node_count()).collect();
        modularity(graph, &singletons, 1.0).unwrap()
    }

    /// Ids are dense and introduced in node order.
    fn is_first_appearance_labeling(labels: &[usize]) -> bool {
        let mut next = 0;
        for &c in labels {
            if c > next {
                return false;
            }
            if c == next {
                next += 1;
            }
        }
        true
    }

    /// `blocks` groups of `size` nodes: dense inside, sparse between.
    fn planted_partition(rng: &mut StdRng, blocks: usize, size: usize) -> Graph {
        let n = blocks * size;
        let mut edges = Vec::new();
        for u in 0..n {
            for v in (u + 1)..n {
                let p = if u / size == v / size { 0.6 } else { 0.02 };
                if rng.random::<f64>() < p {
                    edges.push((u, v, 1.0));
                }
            }
        }
        Graph::from_edges(n, edges).unwrap()
    }

    #[test]
    fn planted_blocks_are_recovered() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(7);
        let graph = planted_partition(&mut rng, 4, 25);
        let result = Louvain::new().run(&graph)?;

        assert_eq!(result.n_communities(), 4);
        for block in 0..4 {
            let members = &result.partition[block * 25..(block + 1) * 25];
            assert!(members.iter().all(|&c| c == members[0]));
        }
        assert!(result.modularity > 0.5);
        Ok(())
    }

    #[test]
    fn metric_layout_refines_planted_blocks() -> Result<()> {
        // Two planted blocks, each laid out as two distant spatial clusters.
        let mut rng = StdRng::seed_from_u64(11);
        let graph = planted_partition(&mut rng, 2, 20);
        let rows: Vec<Vec<f64>> = (0..40)
            .map(|u| {
                let center = 20.0 * (u / 10) as f64;
                vec![
                    center + rng.random_range(-0.5..0.5),
                    rng.random_range(-0.5..0.5),
                ]
            })
            .collect();
        let features = Features::from_rows(&rows)?;

        let plain = louvain(&graph)?;
        let metric = metric_louvain(&graph, &features, &LouvainOptions::default())?;
        let n_plain = plain.iter().copied().max().map_or(0, |c| c + 1);
        let n_metric = metric.iter().copied().max().map_or(0, |c| c + 1);
        assert!(n_metric >= n_plain);

        // Spatial clusters never share a community across planted blocks.
        for u in 0..20 {
            for v in 20..40 {
                assert_ne!(metric[u], metric[v]);
            }
        }
        Ok(())
    }

    #[test]
    fn reruns_are_identical() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(3);
        let graph = planted_partition(&mut rng, 5, 12);
        let first = Louvain::new().run(&graph)?;
        let second = Louvain::new().run(&graph)?;
        assert_eq!(first, second);
        Ok(())
    }

    proptest! {
        #[test]
        fn louvain_never_loses_to_singletons(graph in arb_graph(30)) {
            for strategy in STRATEGIES {
                let result = Louvain::new().with_strategy(strategy).run(&graph).unwrap();
                prop_assert!(result.modularity >= singleton_modularity(&graph) - 1e-9);
            }
        }

        #[test]
        fn reported_modularity_matches_scan(graph in arb_graph(30)) {
            for strategy in STRATEGIES {
                let result = Louvain::new().with_strategy(strategy).run(&graph).unwrap();
                let scanned = modularity(&graph, &result.partition, 1.0).unwrap();
                prop_assert!((scanned - result.modularity).abs() < 1e-9);
            }
        }

        #[test]
        fn flattened_partition_is_valid(graph in arb_graph(30)) {
            for strategy in STRATEGIES {
                let result = Louvain::new().with_strategy(strategy).run(&graph).unwrap();
                prop_assert_eq!(result.partition.len(), graph.node_count());
                prop_assert!(is_first_appearance_labeling(&result.partition));
                prop_assert_eq!(result.dendrogram.flatten(), result.partition.clone());
            }
        }

        #[test]
        fn runs_are_deterministic(graph in arb_graph(30)) {
            let a = Louvain::new().run(&graph).unwrap();
            let b = Louvain::new().run(&graph).unwrap();
            prop_assert_eq!(a, b);

            let pa = Louvain::new().with_strategy(SweepStrategy::Prune).run(&graph).unwrap();
            let pb = Louvain::new().with_strategy(SweepStrategy::Prune).run(&graph).unwrap();
            prop_assert_eq!(pa, pb);
        }

        #[test]
        fn aggregation_preserves_weight_and_modularity(graph in arb_graph(30)) {
            let mut state = CommunityState::singletons(&graph);
            let _ = LocalMoving::new().optimize(&graph, &mut state);
            let fine_q = modularity(&graph, state.assignment(), 1.0).unwrap();

            match aggregate(&graph, state.assignment()).unwrap() {
                Aggregation::Converged => {}
                Aggregation::Coarsened { graph: coarse, partition } => {
                    prop_assert_eq!(partition.len(), graph.node_count());
                    prop_assert!((coarse.total_weight() - graph.total_weight()).abs() < 1e-9);
                    let coarse_q = singleton_modularity(&coarse);
                    prop_assert!((coarse_q - fine_q).abs() < 1e-9);
                }
            }
        }

        #[test]
        fn gain_matches_modularity_difference(
            graph in arb_graph(16),
            labels in proptest::collection::vec(0usize..4, 16),
        ) {
            let n = graph.node_count();
            let state = CommunityState::from_partition(&graph, &labels[..n]).unwrap();
            let objective = Modularity::new();
            let mut links = NeighborLinks::new(n);

            for node in 0..n {
                links.collect(&graph, &state, node);
                let current = state.community_of(node);
                let before = state.modularity(graph.total_weight(), 1.0);
                for &target in links.communities() {
                    let gain = objective.gain(&graph, &state, &links, node, target, current);
                    let mut moved = state.clone();
                    moved.move_node(&graph, &links, node, target);
                    let after = moved.modularity(graph.total_weight(), 1.0);
                    let rescanned = modularity(&graph, moved.assignment(), 1.0).unwrap();
                    prop_assert!((after - before - gain).abs() < 1e-9);
                    prop_assert!((after - rescanned).abs() < 1e-9);
                }
            }
        }

        #[test]
        fn identical_features_change_nothing(graph in arb_graph(25), x in -10.0f64..10.0) {
            let n = graph.node_count();
            let features = Features::from_rows(&vec![vec![x, 1.0]; n]).unwrap();
            let plain = louvain(&graph).unwrap();
            let metric = metric_louvain(&graph, &features, &LouvainOptions::default()).unwrap();
            prop_assert_eq!(plain, metric);
        }
    }
}
