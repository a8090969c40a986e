// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Packet Delivery Session Reconciler

//! Per-session delivery state built from an unordered event stream.
//!
//! The reconciler is the only writer of session state. It keeps the raw
//! per-node status exactly as received and derives the display view on read:
//! a `success` at path index `i` shows every index `< i` as `success` too.
//!
//! Sessions are created either from a send-packet response (known path) or
//! from the first event naming an unknown session id (discovered path).
//! Unseen node ids are appended to the end of the path, which is only
//! correct when events arrive in path order; callers must feed events in
//! transport order through a single entry point.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{DeliveryStatus, PacketEvent, Path};

// ---------------------------------------------------------------------------
// PacketSession
// ---------------------------------------------------------------------------

/// How a session learned its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathOrigin {
    /// Supplied up front by a send-packet response.
    Known,
    /// Grown from node ids seen in events.
    Discovered,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketSession {
    pub id: String,
    pub path: Path,
    pub origin: PathOrigin,
    pub created_ms: f64,
    raw_status: HashMap<u32, DeliveryStatus>,
    latencies: HashMap<u32, f64>,
    messages: HashMap<u32, String>,
    /// Events applied to this session, including the creating one.
    pub event_count: u64,
}

impl PacketSession {
    fn empty(id: String, origin: PathOrigin, created_ms: f64) -> Self {
        Self {
            id,
            path: Vec::new(),
            origin,
            created_ms,
            raw_status: HashMap::new(),
            latencies: HashMap::new(),
            messages: HashMap::new(),
            event_count: 0,
        }
    }

    /// Status as last received for `node`, without prefix closure.
    pub fn raw_status(&self, node: u32) -> Option<DeliveryStatus> {
        self.raw_status.get(&node).copied()
    }

    pub fn cumulative_latency_ms(&self, node: u32) -> Option<f64> {
        self.latencies.get(&node).copied()
    }

    pub fn message(&self, node: u32) -> Option<&str> {
        self.messages.get(&node).map(String::as_str)
    }

    /// Apply one event. Returns true when the node was appended to the path.
    fn apply(&mut self, event: PacketEvent) -> bool {
        self.event_count += 1;
        self.raw_status.insert(event.node_id, event.status);
        if let Some(latency) = event.cumulative_latency_ms {
            self.latencies.insert(event.node_id, latency);
        }
        if let Some(message) = event.message {
            self.messages.insert(event.node_id, message);
        }
        if self.path.contains(&event.node_id) {
            return false;
        }
        self.path.push(event.node_id);
        true
    }

    /// Install an authoritative path, keeping nodes discovered so far.
    fn adopt_path(&mut self, path: Path) {
        let discovered: Vec<u32> = self
            .path
            .iter()
            .copied()
            .filter(|id| !path.contains(id))
            .collect();
        for &id in &path {
            self.raw_status.entry(id).or_insert(DeliveryStatus::Pending);
        }
        self.path = path;
        self.path.extend(discovered);
        self.origin = PathOrigin::Known;
    }

    pub fn view(&self) -> SessionView {
        let derived = derived_statuses(&self.path, &self.raw_status);
        let nodes: Vec<NodeView> = self
            .path
            .iter()
            .zip(derived)
            .map(|(&node_id, status)| NodeView {
                node_id,
                status,
                raw_status: self.raw_status(node_id),
                cumulative_latency_ms: self.cumulative_latency_ms(node_id),
                message: self.messages.get(&node_id).cloned(),
            })
            .collect();
        let completed = nodes.last().map_or(false, |n| n.status.is_success());
        SessionView {
            session_id: self.id.clone(),
            origin: self.origin,
            created_ms: self.created_ms,
            path: self.path.clone(),
            nodes,
            completed,
        }
    }
}

// ---------------------------------------------------------------------------
// Derived view
// ---------------------------------------------------------------------------

/// Display status for each path index, success-closed on the prefix.
///
/// Nodes with no raw status count as pending.
pub fn derived_statuses(path: &[u32], raw: &HashMap<u32, DeliveryStatus>) -> Vec<DeliveryStatus> {
    let last_success = path
        .iter()
        .rposition(|id| raw.get(id).map_or(false, DeliveryStatus::is_success));
    (0..path.len())
        .map(|i| match last_success {
            Some(last) if i <= last => DeliveryStatus::Success,
            _ => DeliveryStatus::Pending,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeView {
    pub node_id: u32,
    /// Prefix-closed display status.
    pub status: DeliveryStatus,
    pub raw_status: Option<DeliveryStatus>,
    pub cumulative_latency_ms: Option<f64>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: String,
    pub origin: PathOrigin,
    pub created_ms: f64,
    pub path: Path,
    pub nodes: Vec<NodeView>,
    /// The last path node shows success.
    pub completed: bool,
}

impl SessionView {
    pub fn status_of(&self, node: u32) -> Option<DeliveryStatus> {
        self.nodes.iter().find(|n| n.node_id == node).map(|n| n.status)
    }
}

// ---------------------------------------------------------------------------
// SessionReconciler
// ---------------------------------------------------------------------------

/// What [`SessionReconciler::handle_event`] did with an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventOutcome {
    /// The session id was unknown; a one-node session was started.
    SessionCreated { session_id: String },
    SessionUpdated { session_id: String, appended_node: bool },
}

impl EventOutcome {
    pub fn session_id(&self) -> &str {
        match self {
            Self::SessionCreated { session_id } | Self::SessionUpdated { session_id, .. } => session_id,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionReconciler {
    sessions: HashMap<String, PacketSession>,
    /// Creation order, for history listings.
    order: Vec<String>,
}

impl SessionReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session from a send-packet response.
    ///
    /// With a path, every path node starts pending. If events for this id
    /// already arrived, the authoritative path replaces the discovered one
    /// and any discovered nodes not on it are kept at the end.
    pub fn create_session(&mut self, id: impl Into<String>, path: Option<Path>, now_ms: f64) -> &PacketSession {
        let id = id.into();
        let origin = if path.is_some() { PathOrigin::Known } else { PathOrigin::Discovered };
        if !self.sessions.contains_key(&id) {
            self.order.push(id.clone());
        }
        let session = self
            .sessions
            .entry(id)
            .or_insert_with_key(|id| PacketSession::empty(id.clone(), origin, now_ms));
        if let Some(path) = path {
            session.adopt_path(path);
        }
        session
    }

    /// Apply one event, creating the session when its id is unknown.
    pub fn handle_event(&mut self, event: PacketEvent, now_ms: f64) -> EventOutcome {
        let session_id = event.session_id.clone();
        match self.sessions.get_mut(&session_id) {
            Some(session) => {
                let appended_node = session.apply(event);
                EventOutcome::SessionUpdated { session_id, appended_node }
            }
            None => {
                tracing::info!(session = %session_id, node = event.node_id, "discovered session from event stream");
                let created_ms = event.arrived_ms.unwrap_or(now_ms);
                let mut session = PacketSession::empty(session_id.clone(), PathOrigin::Discovered, created_ms);
                session.apply(event);
                self.order.push(session_id.clone());
                self.sessions.insert(session_id.clone(), session);
                EventOutcome::SessionCreated { session_id }
            }
        }
    }

    /// Remove a session. Returns false when the id was not live.
    pub fn clear_session(&mut self, id: &str) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            self.order.retain(|s| s != id);
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<&PacketSession> {
        self.sessions.get(id)
    }

    /// Prefix-closed view of one session.
    pub fn view(&self, id: &str) -> Option<SessionView> {
        self.sessions.get(id).map(PacketSession::view)
    }

    /// Live session ids, oldest first.
    pub fn session_ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
