// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Path Metrics Aggregator

//! End-to-end latency and bottleneck throughput for a node path.
//!
//! Each consecutive pair of path nodes is one hop. Hop distance is the slant
//! range between the two nodes and hop rate is the link-budget effective
//! capacity. A path id missing from the node snapshot drops the hop: latency
//! becomes an undercount and throughput is taken over the remaining hops.
//! The number of dropped hops is reported in [`PathMetrics::skipped_hops`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geodesy::node_distance;
use crate::link_budget::{effective_capacity_bps, RadioParams};
use crate::types::{Node, PathMetrics};

/// Speed of light in vacuum, m/s.
pub const SPEED_OF_LIGHT_MPS: f64 = 299_792_458.0;
/// Typical Ethernet MTU.
pub const DEFAULT_PACKET_BYTES: u32 = 1500;

// ─── NodeLookup ──────────────────────────────────────────────────────────────

/// Read access to a node snapshot by id.
pub trait NodeLookup {
    fn node(&self, id: u32) -> Option<&Node>;
}

impl NodeLookup for HashMap<u32, Node> {
    fn node(&self, id: u32) -> Option<&Node> {
        self.get(&id)
    }
}

impl NodeLookup for [Node] {
    fn node(&self, id: u32) -> Option<&Node> {
        self.iter().find(|n| n.id == id)
    }
}

impl NodeLookup for Vec<Node> {
    fn node(&self, id: u32) -> Option<&Node> {
        self.as_slice().node(id)
    }
}

// ─── MetricsParams ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsParams {
    pub radio: RadioParams,
    pub packet_bytes: u32,
    /// Fixed per-hop processing delay, ms.
    pub proc_delay_ms: f64,
    /// Fixed per-hop queueing delay, ms.
    pub queue_delay_ms: f64,
}

impl Default for MetricsParams {
    fn default() -> Self {
        Self {
            radio: RadioParams::default(),
            packet_bytes: DEFAULT_PACKET_BYTES,
            proc_delay_ms: 1.0,
            queue_delay_ms: 0.0,
        }
    }
}

// ─── Per-hop delays ──────────────────────────────────────────────────────────

/// Serialization delay in ms; infinite when the hop has no usable rate.
pub fn transmission_delay_ms(packet_bytes: u32, rate_bps: f64) -> f64 {
    if rate_bps <= 0.0 {
        return f64::INFINITY;
    }
    packet_bytes as f64 * 8.0 / rate_bps * 1000.0
}

pub fn propagation_delay_ms(distance_m: f64) -> f64 {
    distance_m / SPEED_OF_LIGHT_MPS * 1000.0
}

/// Total one-hop latency in ms. Processing and queueing terms are clamped to >= 0.
pub fn hop_latency_ms(
    packet_bytes: u32,
    rate_bps: f64,
    distance_m: f64,
    proc_delay_ms: f64,
    queue_delay_ms: f64,
) -> f64 {
    transmission_delay_ms(packet_bytes, rate_bps)
        + propagation_delay_ms(distance_m)
        + proc_delay_ms.max(0.0)
        + queue_delay_ms.max(0.0)
}

// ─── HopMetrics ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HopMetrics {
    pub from: u32,
    pub to: u32,
    pub distance_m: f64,
    pub capacity_bps: f64,
    pub latency_ms: f64,
}

fn measure_hop(a: &Node, b: &Node, params: &MetricsParams) -> HopMetrics {
    let distance_m = node_distance(a, b);
    let capacity_bps = effective_capacity_bps(distance_m, &params.radio);
    // Floor at 1 bps so a dead hop reads as very slow rather than infinite
    let latency_ms = hop_latency_ms(
        params.packet_bytes,
        capacity_bps.max(1.0),
        distance_m,
        params.proc_delay_ms,
        params.queue_delay_ms,
    );
    HopMetrics { from: a.id, to: b.id, distance_m, capacity_bps, latency_ms }
}

/// Measure every resolvable hop of `path`.
///
/// Returns the measured hops in path order and the count of hops skipped
/// because one of their endpoints is not in `nodes`.
pub fn hop_breakdown<N: NodeLookup + ?Sized>(
    path: &[u32],
    nodes: &N,
    params: &MetricsParams,
) -> (Vec<HopMetrics>, u32) {
    let mut hops = Vec::with_capacity(path.len().saturating_sub(1));
    let mut skipped = 0;
    for pair in path.windows(2) {
        match (nodes.node(pair[0]), nodes.node(pair[1])) {
            (Some(a), Some(b)) => hops.push(measure_hop(a, b, params)),
            _ => skipped += 1,
        }
    }
    (hops, skipped)
}

/// Latency and bottleneck throughput in one walk of the path.
///
/// A node without `alt_m` sits at its kind's default altitude (air 10 km,
/// satellite 550 km). A backend that reads a missing altitude as 0 will report
/// different numbers for such paths; set `alt_m` explicitly to match it.
pub fn path_metrics<N: NodeLookup + ?Sized>(
    path: &[u32],
    nodes: &N,
    params: &MetricsParams,
) -> PathMetrics {
    let (hops, skipped_hops) = hop_breakdown(path, nodes, params);
    let latency_ms = hops.iter().map(|h| h.latency_ms).sum();
    let throughput_bps = hops
        .iter()
        .map(|h| h.capacity_bps)
        .reduce(f64::min)
        .unwrap_or(0.0);
    PathMetrics {
        latency_ms,
        throughput_bps,
        hops: hops.len() as u32,
        skipped_hops,
    }
}

/// Sum of hop latencies in ms; 0 for paths shorter than two nodes.
pub fn path_latency_ms<N: NodeLookup + ?Sized>(path: &[u32], nodes: &N, params: &MetricsParams) -> f64 {
    if path.len() < 2 {
        return 0.0;
    }
    path_metrics(path, nodes, params).latency_ms
}

/// Minimum hop capacity in bps; 0 when no hop resolves.
pub fn path_throughput_bps<N: NodeLookup + ?Sized>(path: &[u32], nodes: &N, params: &MetricsParams) -> f64 {
    path_metrics(path, nodes, params).throughput_bps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeKind;

    fn equator_nodes() -> HashMap<u32, Node> {
        [
            Node::new(1, NodeKind::Ground, 0.0, 0.0),
            Node::new(2, NodeKind::Ground, 0.0, 1.0),
            Node::new(3, NodeKind::Ground, 0.0, 2.0),
        ]
        .into_iter()
        .map(|n| (n.id, n))
        .collect()
    }

    #[test]
    fn missing_altitude_uses_kind_default() {
        let params = MetricsParams::default();
        let implicit: HashMap<u32, Node> = [
            Node::new(1, NodeKind::Ground, 0.0, 0.0),
            Node::new(2, NodeKind::Air, 0.0, 1.0),
        ]
        .into_iter()
        .map(|n| (n.id, n))
        .collect();
        let mut flat = implicit.clone();
        flat.insert(2, Node::new(2, NodeKind::Air, 0.0, 1.0).with_alt(0.0));
        let mut cruising = implicit.clone();
        cruising.insert(2, Node::new(2, NodeKind::Air, 0.0, 1.0).with_alt(10_000.0));

        let implicit = path_metrics(&[1, 2], &implicit, &params);
        let flat = path_metrics(&[1, 2], &flat, &params);
        let cruising = path_metrics(&[1, 2], &cruising, &params);
        assert!(implicit.latency_ms > flat.latency_ms);
        assert_eq!(implicit.latency_ms, cruising.latency_ms);
    }

    #[test]
    fn hop_latency_components() {
        // 1500 B at 12 Mbps = 1 ms, 299.792458 km = 1 ms, plus 1 ms proc
        let l = hop_latency_ms(1500, 12e6, 299_792.458, 1.0, 0.0);
        assert!((l - 3.0).abs() < 1e-9, "got {l}");
    }

    #[test]
    fn hop_latency_infinite_without_rate() {
        assert!(hop_latency_ms(1500, 0.0, 10.0, 0.0, 0.0).is_infinite());
    }

    #[test]
    fn hop_latency_clamps_negative_fixed_terms() {
        let base = hop_latency_ms(1500, 1e6, 0.0, 0.0, 0.0);
        let clamped = hop_latency_ms(1500, 1e6, 0.0, -5.0, -5.0);
        assert_eq!(base, clamped);
    }

    #[test]
    fn short_paths_have_zero_latency() {
        let nodes = equator_nodes();
        let params = MetricsParams::default();
        assert_eq!(path_latency_ms(&[], &nodes, &params), 0.0);
        assert_eq!(path_latency_ms(&[1], &nodes, &params), 0.0);
        assert_eq!(path_throughput_bps(&[1], &nodes, &params), 0.0);
    }

    #[test]
    fn three_node_equator_scenario() {
        let nodes = equator_nodes();
        let params = MetricsParams::default();
        let path = [1, 2, 3];

        let latency = path_latency_ms(&path, &nodes, &params);
        assert!(latency.is_finite() && latency > 0.0, "latency {latency}");

        let hop_a = effective_capacity_bps(node_distance(&nodes[&1], &nodes[&2]), &params.radio);
        let hop_b = effective_capacity_bps(node_distance(&nodes[&2], &nodes[&3]), &params.radio);
        let throughput = path_throughput_bps(&path, &nodes, &params);
        assert_eq!(throughput, hop_a.min(hop_b));
    }

    #[test]
    fn throughput_is_bottleneck_of_every_hop() {
        let mut nodes = equator_nodes();
        nodes.insert(4, Node::new(4, NodeKind::Satellite, 3.0, 2.0));
        let params = MetricsParams::default();
        let path = [1, 2, 3, 4];
        let (hops, skipped) = hop_breakdown(&path, &nodes, &params);
        assert_eq!(skipped, 0);
        let throughput = path_throughput_bps(&path, &nodes, &params);
        for hop in &hops {
            assert!(throughput <= hop.capacity_bps);
        }
    }

    #[test]
    fn appending_slower_hop_lowers_throughput() {
        let mut nodes = equator_nodes();
        nodes.insert(9, Node::new(9, NodeKind::Satellite, 0.0, 2.0));
        nodes.insert(8, Node::new(8, NodeKind::Ground, 0.0, 2.1));
        let params = MetricsParams::default();

        let before = path_throughput_bps(&[1, 2, 3], &nodes, &params);
        // 550 km vertical hop is far weaker than the 111 km ground hops
        let slower = path_throughput_bps(&[1, 2, 3, 9], &nodes, &params);
        assert!(slower < before);
        // ~11 km hop is stronger and leaves the bottleneck alone
        let faster = path_throughput_bps(&[1, 2, 3, 8], &nodes, &params);
        assert_eq!(faster, before);
    }

    #[test]
    fn missing_nodes_skip_hops() {
        let nodes = equator_nodes();
        let params = MetricsParams::default();
        let full = path_metrics(&[1, 2, 3], &nodes, &params);
        let holed = path_metrics(&[1, 2, 42, 3], &nodes, &params);
        assert_eq!(holed.hops, 1);
        assert_eq!(holed.skipped_hops, 2);
        assert!(holed.latency_ms < full.latency_ms);
        let rel = (holed.throughput_bps - full.throughput_bps).abs() / full.throughput_bps;
        assert!(rel < 1e-9, "throughput drifted by {rel}");

        let none = path_metrics(&[40, 41], &nodes, &params);
        assert_eq!(none.throughput_bps, 0.0);
        assert_eq!(none.latency_ms, 0.0);
    }

    #[test]
    fn slice_lookup_matches_map_lookup() {
        let map = equator_nodes();
        let mut list: Vec<Node> = map.values().cloned().collect();
        list.sort_by_key(|n| n.id);
        let params = MetricsParams::default();
        assert_eq!(
            path_metrics(&[1, 2, 3], &map, &params),
            path_metrics(&[1, 2, 3], &list, &params),
        );
    }
}
