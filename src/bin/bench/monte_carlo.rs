// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Monte Carlo Runner
//
// N runs per scenario, seeds base..base+N. Each run builds a fresh
// constellation, samples (src, dst) pairs and compares the random-walk
// baseline against a BFS shortest-hop reference on the same links.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sagsin_pathkit::path_metrics::path_metrics;
use sagsin_pathkit::rwr::{run_rwr, Adjacency};
use sagsin_pathkit::{MetricsParams, Node, Path};

use crate::report::*;
use crate::scenarios::Scenario;

/// Fewest-hop path over `adjacency`, or None when `dst` is unreachable.
pub fn bfs_path(adjacency: &Adjacency, src: u32, dst: u32) -> Option<Path> {
    let mut parent: HashMap<u32, u32> = HashMap::new();
    let mut queue = VecDeque::from([src]);
    parent.insert(src, src);
    while let Some(current) = queue.pop_front() {
        if current == dst {
            let mut path = vec![dst];
            let mut at = dst;
            while at != src {
                at = parent[&at];
                path.push(at);
            }
            path.reverse();
            return Some(path);
        }
        for &next in adjacency.neighbors(current) {
            if !parent.contains_key(&next) {
                parent.insert(next, current);
                queue.push_back(next);
            }
        }
    }
    None
}

fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        0.0
    } else {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
}

/// Run a single scenario iteration with a specific seed.
pub fn run_single(scenario: &Scenario, seed: u64) -> RunResult {
    let start = Instant::now();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let constellation = scenario.generate(&mut rng);
    let nodes: &[Node] = &constellation.nodes;
    let adjacency = Adjacency::from_links(&constellation.links);
    let metrics = MetricsParams::default();
    let n = scenario.node_count();

    let mut reachable_pairs = 0u32;
    let mut rwr_found = 0u32;
    let mut stretch = Vec::new();
    let mut rwr_latency = Vec::new();
    let mut bfs_latency = Vec::new();
    let mut rwr_throughput = Vec::new();
    let mut bfs_throughput = Vec::new();

    for _ in 0..scenario.pairs {
        let src = rng.gen_range(1..=n);
        let mut dst = rng.gen_range(1..=n);
        while dst == src && n > 1 {
            dst = rng.gen_range(1..=n);
        }
        let Some(reference) = bfs_path(&adjacency, src, dst) else {
            continue;
        };
        reachable_pairs += 1;
        let outcome = run_rwr(&adjacency, src, dst, &scenario.rwr, &mut rng);
        let Some(walk) = outcome.path else {
            continue;
        };
        rwr_found += 1;

        let ref_hops = (reference.len() - 1).max(1) as f64;
        stretch.push((walk.len() - 1) as f64 / ref_hops);

        let walk_metrics = path_metrics(&walk, nodes, &metrics);
        let ref_metrics = path_metrics(&reference, nodes, &metrics);
        rwr_latency.push(walk_metrics.latency_ms);
        bfs_latency.push(ref_metrics.latency_ms);
        rwr_throughput.push(walk_metrics.throughput_mbps());
        bfs_throughput.push(ref_metrics.throughput_mbps());
    }

    let success_rate = if reachable_pairs == 0 {
        1.0
    } else {
        rwr_found as f64 / reachable_pairs as f64
    };
    let mean_stretch = mean(&stretch);

    let mut pass = success_rate >= scenario.criteria.min_success_rate;
    if let Some(max_stretch) = scenario.criteria.max_mean_stretch {
        if mean_stretch > max_stretch {
            pass = false;
        }
    }

    tracing::debug!(
        scenario = scenario.name,
        seed,
        reachable_pairs,
        rwr_found,
        mean_stretch,
        "run finished"
    );

    RunResult {
        seed,
        pass,
        nodes: n,
        enabled_links: constellation.links.iter().filter(|l| l.enabled).count(),
        reachable_pairs,
        rwr_found,
        success_rate,
        mean_stretch,
        mean_rwr_latency_ms: mean(&rwr_latency),
        mean_bfs_latency_ms: mean(&bfs_latency),
        mean_rwr_throughput_mbps: mean(&rwr_throughput),
        mean_bfs_throughput_mbps: mean(&bfs_throughput),
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    }
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(scenario: &Scenario, n_runs: usize, base_seed: u64) -> ScenarioReport {
    let results: Vec<RunResult> = (0..n_runs)
        .map(|i| run_single(scenario, base_seed + i as u64))
        .collect();
    aggregate(scenario, results)
}

fn aggregate(scenario: &Scenario, results: Vec<RunResult>) -> ScenarioReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let stats = |f: fn(&RunResult) -> f64| Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>());

    ScenarioReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate: if n == 0 { 0.0 } else { passed as f64 / n as f64 },
        success_rate: stats(|r| r.success_rate),
        stretch: stats(|r| r.mean_stretch),
        rwr_latency_ms: stats(|r| r.mean_rwr_latency_ms),
        bfs_latency_ms: stats(|r| r.mean_bfs_latency_ms),
        rwr_throughput_mbps: stats(|r| r.mean_rwr_throughput_mbps),
        bfs_throughput_mbps: stats(|r| r.mean_bfs_throughput_mbps),
        elapsed_ms: stats(|r| r.elapsed_ms),
        individual_runs: results,
    }
}
