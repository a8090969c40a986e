// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Shared Data Model

use serde::{Deserialize, Serialize};

/// An ordered sequence of node ids. Repeated ids are allowed.
pub type Path = Vec<u32>;

// ─── NodeKind ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Ground,
    Air,
    Sea,
    #[serde(alias = "sat")]
    Satellite,
}

impl NodeKind {
    /// Altitude assumed when a node arrives without one.
    pub fn default_altitude_m(&self) -> f64 {
        match self {
            Self::Ground | Self::Sea => 0.0,
            Self::Air => 10_000.0,
            Self::Satellite => 550_000.0,
        }
    }

    /// Kinds whose position changes between snapshot refreshes.
    pub fn is_mobile(&self) -> bool {
        !matches!(self, Self::Ground)
    }
}

// ─── Orbit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Orbit {
    #[serde(default)]
    pub norad_id: Option<u32>,
    #[serde(default)]
    pub tle1: Option<String>,
    #[serde(default)]
    pub tle2: Option<String>,
}

// ─── Node ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: NodeKind,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub alt_m: Option<f64>,
    #[serde(default)]
    pub orbit: Option<Orbit>,
}

impl Node {
    pub fn new(id: u32, kind: NodeKind, lat: f64, lon: f64) -> Self {
        Self {
            id,
            name: format!("{:?}-{}", kind, id).to_lowercase(),
            kind,
            lat,
            lon,
            alt_m: None,
            orbit: None,
        }
    }

    pub fn with_alt(mut self, alt_m: f64) -> Self {
        self.alt_m = Some(alt_m);
        self
    }

    /// Altitude in meters, falling back to the kind default.
    pub fn altitude_m(&self) -> f64 {
        self.alt_m.unwrap_or_else(|| self.kind.default_altitude_m())
    }
}

// ─── Link ────────────────────────────────────────────────────────────────────

fn default_enabled() -> bool {
    true
}

/// Undirected edge between two nodes. Only `enabled` changes during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub u: u32,
    pub v: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub capacity_mbps: Option<f64>,
}

impl Link {
    pub fn new(u: u32, v: u32) -> Self {
        Self { u, v, enabled: true, latency_ms: None, capacity_mbps: None }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn connects(&self, a: u32, b: u32) -> bool {
        (self.u == a && self.v == b) || (self.u == b && self.v == a)
    }
}

// ─── Positions ───────────────────────────────────────────────────────────────

/// One record of `GET /nodes/positions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub id: u32,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub alt_km: Option<f64>,
}

// ─── Delivery ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    #[default]
    Pending,
    Success,
}

impl DeliveryStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// A single per-hop delivery notification in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketEvent {
    pub session_id: String,
    pub node_id: u32,
    pub status: DeliveryStatus,
    #[serde(default)]
    pub arrived_ms: Option<f64>,
    #[serde(default)]
    pub cumulative_latency_ms: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl PacketEvent {
    pub fn new(session_id: impl Into<String>, node_id: u32, status: DeliveryStatus) -> Self {
        Self {
            session_id: session_id.into(),
            node_id,
            status,
            arrived_ms: None,
            cumulative_latency_ms: None,
            message: None,
        }
    }

    pub fn with_latency(mut self, cumulative_latency_ms: f64) -> Self {
        self.cumulative_latency_ms = Some(cumulative_latency_ms);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ─── PathMetrics ─────────────────────────────────────────────────────────────

/// Derived end-to-end metrics for one path against one node snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PathMetrics {
    pub latency_ms: f64,
    /// Bottleneck capacity; 0 when no hop could be resolved.
    pub throughput_bps: f64,
    pub hops: u32,
    /// Hops dropped because a node id was missing from the snapshot.
    pub skipped_hops: u32,
}

impl PathMetrics {
    pub fn throughput_mbps(&self) -> f64 {
        self.throughput_bps / 1e6
    }
}
