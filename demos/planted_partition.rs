use std::collections::BTreeMap;

use metric_louvain::community::{Features, Louvain, LouvainOptions, MetricLouvain};
use metric_louvain::{modularity, Graph};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Planted partition graph plus a 2-D layout: plain Louvain vs metric Louvain.
    //
    // Run with `RUST_LOG=debug` to see per-level progress.
    env_logger::init();

    let mut rng = StdRng::seed_from_u64(42);
    let (blocks, size) = (6, 30);
    let n = blocks * size;

    let mut edges = Vec::new();
    for u in 0..n {
        for v in (u + 1)..n {
            let p = if u / size == v / size { 0.3 } else { 0.01 };
            if rng.random::<f64>() < p {
                edges.push((u, v, 1.0));
            }
        }
    }
    let graph = Graph::from_edges(n, edges)?;

    // Blocks sit on a circle; each node jitters around its block center.
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|u| {
            let angle = std::f64::consts::TAU * (u / size) as f64 / blocks as f64;
            vec![
                10.0 * angle.cos() + rng.random_range(-1.0..1.0),
                10.0 * angle.sin() + rng.random_range(-1.0..1.0),
            ]
        })
        .collect();
    let features = Features::from_rows(&rows)?;

    println!(
        "n_nodes={} n_edges={} total_weight={:.1}",
        graph.node_count(),
        graph.edge_count(),
        graph.total_weight()
    );

    let plain = Louvain::new().run(&graph)?;
    println!(
        "louvain: communities={} levels={} modularity={:.4}",
        plain.n_communities(),
        plain.dendrogram.n_levels(),
        plain.modularity
    );

    let options = LouvainOptions {
        distance_scale: 4.0,
        ..Default::default()
    };
    let metric = MetricLouvain::new(features)
        .with_louvain(options.louvain())
        .with_weighting(options.weighting())
        .run(&graph)?;
    println!(
        "metric louvain: communities={} levels={} modularity={:.4} (on reweighted graph), {:.4} (on input graph)",
        metric.n_communities(),
        metric.dendrogram.n_levels(),
        metric.modularity,
        modularity(&graph, &metric.partition, 1.0)?
    );

    let mut by_comm: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (node, &comm) in metric.partition.iter().enumerate() {
        by_comm.entry(comm).or_default().push(node);
    }
    for (comm, nodes) in by_comm {
        let planted: BTreeMap<usize, usize> = nodes.iter().fold(BTreeMap::new(), |mut acc, &u| {
            *acc.entry(u / size).or_default() += 1;
            acc
        });
        println!("  community {comm}: {} nodes, planted blocks {planted:?}", nodes.len());
    }

    Ok(())
}
