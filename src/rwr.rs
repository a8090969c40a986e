// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Random-Walk-with-Restart Baseline

//! Randomized baseline pathfinder.
//!
//! Not an optimizer: it samples independent random walks over the
//! enabled links and keeps the shortest walk that ended on the destination.
//! A `None` result is a soft negative, not proof that `src` and `dst` are
//! disconnected. The random source is injected so runs are reproducible.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{Link, Path};

// ---------------------------------------------------------------------------
// Adjacency
// ---------------------------------------------------------------------------

/// Undirected adjacency over the enabled subset of a link list.
///
/// Neighbor order follows link order, so a seeded walk is reproducible.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    neighbors: HashMap<u32, Vec<u32>>,
}

impl Adjacency {
    pub fn from_links<'a>(links: impl IntoIterator<Item = &'a Link>) -> Self {
        let mut neighbors: HashMap<u32, Vec<u32>> = HashMap::new();
        for link in links.into_iter().filter(|l| l.enabled && l.u != l.v) {
            let fwd = neighbors.entry(link.u).or_default();
            if !fwd.contains(&link.v) {
                fwd.push(link.v);
            }
            let back = neighbors.entry(link.v).or_default();
            if !back.contains(&link.u) {
                back.push(link.u);
            }
        }
        Self { neighbors }
    }

    pub fn neighbors(&self, id: u32) -> &[u32] {
        self.neighbors.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RwrParams {
    /// Independent walks to sample.
    pub attempts: u32,
    /// Per-step probability of jumping back to the source.
    pub restart_prob: f64,
    /// Step budget of a single walk.
    pub max_len: u32,
}

impl Default for RwrParams {
    fn default() -> Self {
        Self { attempts: 300, restart_prob: 0.15, max_len: 200 }
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RwrOutcome {
    /// Shortest successful walk, earliest one on ties.
    pub path: Option<Path>,
    /// Walks that ended on the destination.
    pub successes: u32,
    pub attempts: u32,
}

/// One walk from `src`. Returns the walk if it ended on `dst`.
fn walk<R: Rng>(
    adjacency: &Adjacency,
    src: u32,
    dst: u32,
    params: &RwrParams,
    rng: &mut R,
) -> Option<Path> {
    let mut current = src;
    let mut path = vec![src];
    for _ in 0..params.max_len {
        if rng.gen::<f64>() < params.restart_prob {
            current = src;
            path.clear();
            path.push(src);
            continue;
        }
        let neighbors = adjacency.neighbors(current);
        if neighbors.is_empty() {
            return None;
        }
        current = neighbors[rng.gen_range(0..neighbors.len())];
        path.push(current);
        if current == dst {
            break;
        }
    }
    (current == dst).then_some(path)
}

/// Sample `params.attempts` walks and keep the shortest that reached `dst`.
pub fn run_rwr<R: Rng>(
    adjacency: &Adjacency,
    src: u32,
    dst: u32,
    params: &RwrParams,
    rng: &mut R,
) -> RwrOutcome {
    if src == dst {
        return RwrOutcome { path: Some(vec![src]), successes: 1, attempts: 0 };
    }

    let mut best: Option<Path> = None;
    let mut successes = 0;
    for _ in 0..params.attempts {
        if let Some(path) = walk(adjacency, src, dst, params, rng) {
            successes += 1;
            if best.as_ref().map_or(true, |b| path.len() < b.len()) {
                best = Some(path);
            }
        }
    }

    tracing::debug!(
        src,
        dst,
        successes,
        attempts = params.attempts,
        hops = ?best.as_ref().map(|p| p.len().saturating_sub(1)),
        "random walk baseline finished"
    );

    RwrOutcome { path: best, successes, attempts: params.attempts }
}

/// Convenience wrapper: build the enabled-link adjacency and return only the path.
pub fn find_path<R: Rng>(
    links: &[Link],
    src: u32,
    dst: u32,
    params: &RwrParams,
    rng: &mut R,
) -> Option<Path> {
    run_rwr(&Adjacency::from_links(links), src, dst, params, rng).path
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ring(n: u32) -> Vec<Link> {
        (0..n).map(|i| Link::new(i, (i + 1) % n)).collect()
    }

    fn assert_valid_walk(path: &[u32], links: &[Link], src: u32, dst: u32) {
        assert_eq!(path.first(), Some(&src));
        assert_eq!(path.last(), Some(&dst));
        for pair in path.windows(2) {
            assert!(
                links.iter().any(|l| l.enabled && l.connects(pair[0], pair[1])),
                "{:?} is not an enabled link",
                pair
            );
        }
    }

    #[test]
    fn isolated_source_finds_nothing() {
        let links = vec![Link::new(2, 3), Link::new(3, 4)];
        let params = RwrParams { attempts: 10, restart_prob: 0.15, max_len: 5 };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let outcome = run_rwr(&Adjacency::from_links(&links), 1, 4, &params, &mut rng);
        assert_eq!(outcome.path, None);
        assert_eq!(outcome.successes, 0);
    }

    #[test]
    fn line_graph_finds_direct_path() {
        let links = vec![Link::new(1, 2), Link::new(2, 3)];
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let path = find_path(&links, 1, 3, &RwrParams::default(), &mut rng);
        assert_eq!(path, Some(vec![1, 2, 3]));
    }

    #[test]
    fn disabled_links_are_not_walked() {
        let links = vec![Link::new(1, 2), Link::new(2, 3).disabled()];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(find_path(&links, 1, 3, &RwrParams::default(), &mut rng), None);
    }

    #[test]
    fn same_seed_same_result() {
        let links = ring(12);
        let params = RwrParams::default();
        let a = run_rwr(&Adjacency::from_links(&links), 0, 6, &params, &mut ChaCha8Rng::seed_from_u64(99));
        let b = run_rwr(&Adjacency::from_links(&links), 0, 6, &params, &mut ChaCha8Rng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn found_paths_follow_enabled_links() {
        let mut links = ring(10);
        links.push(Link::new(0, 5));
        links.push(Link::new(2, 7).disabled());
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            if let Some(path) = find_path(&links, 0, 7, &RwrParams::default(), &mut rng) {
                assert_valid_walk(&path, &links, 0, 7);
            }
        }
    }

    #[test]
    fn source_equals_destination() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(find_path(&[], 4, 4, &RwrParams::default(), &mut rng), Some(vec![4]));
    }

    #[test]
    fn zero_attempts_is_a_soft_negative() {
        let links = vec![Link::new(1, 2)];
        let params = RwrParams { attempts: 0, ..Default::default() };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(find_path(&links, 1, 2, &params, &mut rng), None);
    }

    #[test]
    fn adjacency_dedups_and_drops_self_loops() {
        let links = vec![Link::new(1, 2), Link::new(2, 1), Link::new(3, 3)];
        let adj = Adjacency::from_links(&links);
        assert_eq!(adj.neighbors(1), &[2]);
        assert_eq!(adj.neighbors(2), &[1]);
        assert!(adj.neighbors(3).is_empty());
    }
}
