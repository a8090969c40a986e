// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Bench Scenarios
//
// Synthetic constellations: nodes scattered over a lat/lon box, links wherever
// two nodes are within range for their kind pair.

use rand::Rng;
use sagsin_pathkit::geodesy::node_distance;
use sagsin_pathkit::{Link, Node, NodeKind, RwrParams};

// ─── Link Range Table ───────────────────────────────────────────────────────

/// Maximum link range in km per kind pair. Unlisted pairs (anything
/// involving a sea node) use `default_km`.
#[derive(Debug, Clone, Copy)]
pub struct RangeTable {
    pub ground_ground: f64,
    pub ground_air: f64,
    pub air_air: f64,
    pub ground_sat: f64,
    pub air_sat: f64,
    pub sat_sat: f64,
    pub default_km: f64,
}

impl Default for RangeTable {
    fn default() -> Self {
        Self {
            ground_ground: 150.0,
            ground_air: 300.0,
            air_air: 400.0,
            ground_sat: 2_000.0,
            air_sat: 2_000.0,
            sat_sat: 3_000.0,
            default_km: 500.0,
        }
    }
}

impl RangeTable {
    pub fn max_range_km(&self, a: NodeKind, b: NodeKind) -> f64 {
        use NodeKind::*;
        match (a, b) {
            (Ground, Ground) => self.ground_ground,
            (Ground, Air) | (Air, Ground) => self.ground_air,
            (Air, Air) => self.air_air,
            (Ground, Satellite) | (Satellite, Ground) => self.ground_sat,
            (Air, Satellite) | (Satellite, Air) => self.air_sat,
            (Satellite, Satellite) => self.sat_sat,
            _ => self.default_km,
        }
    }
}

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub ground: u32,
    pub air: u32,
    pub sea: u32,
    pub satellites: u32,
    /// Half-width of the lat/lon box, degrees.
    pub span_deg: f64,
    pub ranges: RangeTable,
    pub rwr: RwrParams,
    /// Random (src, dst) pairs per run.
    pub pairs: u32,
    /// Fraction of links disabled after generation.
    pub link_failure: f64,
    pub criteria: PassCriteria,
}

pub struct PassCriteria {
    /// Over pairs the reference search can connect.
    pub min_success_rate: f64,
    pub max_mean_stretch: Option<f64>,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self { min_success_rate: 0.9, max_mean_stretch: None }
    }
}

pub struct Constellation {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl Scenario {
    pub fn node_count(&self) -> u32 {
        self.ground + self.air + self.sea + self.satellites
    }

    pub fn generate<R: Rng>(&self, rng: &mut R) -> Constellation {
        let kinds = std::iter::repeat(NodeKind::Ground)
            .take(self.ground as usize)
            .chain(std::iter::repeat(NodeKind::Air).take(self.air as usize))
            .chain(std::iter::repeat(NodeKind::Sea).take(self.sea as usize))
            .chain(std::iter::repeat(NodeKind::Satellite).take(self.satellites as usize));

        let nodes: Vec<Node> = kinds
            .enumerate()
            .map(|(i, kind)| {
                let lat = rng.gen_range(-self.span_deg..=self.span_deg);
                let lon = rng.gen_range(-self.span_deg..=self.span_deg);
                Node::new(i as u32 + 1, kind, lat, lon)
            })
            .collect();

        let mut links = Vec::new();
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                let km = node_distance(a, b) / 1000.0;
                if km > self.ranges.max_range_km(a.kind, b.kind) {
                    continue;
                }
                let mut link = Link::new(a.id, b.id);
                link.enabled = !rng.gen_bool(self.link_failure);
                links.push(link);
            }
        }
        Constellation { nodes, links }
    }
}

// ─── Scenario Table ─────────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "REGIONAL_GROUND_MESH",
            label: "Regional ground mesh",
            category: "terrestrial",
            ground: 40,
            air: 0,
            sea: 0,
            satellites: 0,
            span_deg: 3.0,
            ranges: RangeTable::default(),
            rwr: RwrParams::default(),
            pairs: 20,
            link_failure: 0.0,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "AIR_RELAY",
            label: "Ground + UAV relay layer",
            category: "aerial",
            ground: 24,
            air: 12,
            sea: 0,
            satellites: 0,
            span_deg: 4.0,
            ranges: RangeTable::default(),
            rwr: RwrParams::default(),
            pairs: 20,
            link_failure: 0.0,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "MARITIME_SAT_BACKHAUL",
            label: "Sea nodes with LEO backhaul",
            category: "integrated",
            ground: 6,
            air: 4,
            sea: 16,
            satellites: 6,
            span_deg: 8.0,
            ranges: RangeTable::default(),
            rwr: RwrParams::default(),
            pairs: 20,
            link_failure: 0.0,
            criteria: PassCriteria { min_success_rate: 0.95, max_mean_stretch: Some(3.0) },
        },
        Scenario {
            name: "FULL_SAGSIN",
            label: "Space-air-ground-sea mix",
            category: "integrated",
            ground: 20,
            air: 10,
            sea: 10,
            satellites: 8,
            span_deg: 6.0,
            ranges: RangeTable::default(),
            rwr: RwrParams::default(),
            pairs: 30,
            link_failure: 0.0,
            criteria: PassCriteria::default(),
        },
        Scenario {
            name: "DEGRADED_LINKS",
            label: "Full mix, 20% links down",
            category: "resilience",
            ground: 20,
            air: 10,
            sea: 10,
            satellites: 8,
            span_deg: 6.0,
            ranges: RangeTable::default(),
            rwr: RwrParams::default(),
            pairs: 30,
            link_failure: 0.2,
            criteria: PassCriteria { min_success_rate: 0.8, max_mean_stretch: None },
        },
        Scenario {
            name: "SHORT_WALKS",
            label: "Full mix, 30-step walk budget",
            category: "sensitivity",
            ground: 20,
            air: 10,
            sea: 10,
            satellites: 8,
            span_deg: 6.0,
            ranges: RangeTable::default(),
            rwr: RwrParams { attempts: 300, restart_prob: 0.15, max_len: 30 },
            pairs: 30,
            link_failure: 0.0,
            criteria: PassCriteria { min_success_rate: 0.5, max_mean_stretch: None },
        },
    ]
}
