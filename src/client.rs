// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Client State

//! The engine as one owned value.
//!
//! [`PathKitClient`] bundles the snapshot store, the session reconciler, the
//! event pump and (natively) the position poller. Every session mutation goes
//! through `&mut self`, so events are applied one at a time in the order the
//! pump received them.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::backend::{
    Backend, BackendError, RouteRequest, RouteResponse, SendPacketRequest, SendPacketResponse,
    ToggleLinkRequest,
};
use crate::config::{ClientConfig, ConfigError};
use crate::events::{decode_event, DecodeError, SseFrame};
use crate::path_metrics::{self, HopMetrics};
use crate::rwr::{run_rwr, Adjacency, RwrOutcome};
use crate::session::{EventOutcome, PacketSession, SessionReconciler, SessionView};
use crate::snapshot::{GraphSnapshot, SnapshotStore};
use crate::types::{PacketEvent, Path, PathMetrics, PositionUpdate};

// ---------------------------------------------------------------------------
// Event pump
// ---------------------------------------------------------------------------

/// Anything a transport can hand to the pump.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    /// One JSON event object.
    Json(String),
    /// One complete SSE frame.
    Frame(SseFrame),
    /// Already decoded by the producer.
    Decoded(PacketEvent),
}

impl RawEvent {
    pub fn decode(self) -> Result<PacketEvent, DecodeError> {
        match self {
            Self::Json(json) => decode_event(&json),
            Self::Frame(frame) => frame.decode(),
            Self::Decoded(event) => Ok(event),
        }
    }
}

/// Producer side of the pump. Cheap to clone and `Send`.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<RawEvent>,
}

impl EventSender {
    /// Queue one item. Returns false once the client has shut down.
    pub fn send(&self, raw: RawEvent) -> bool {
        self.tx.send(raw).is_ok()
    }

    pub fn send_json(&self, json: impl Into<String>) -> bool {
        self.send(RawEvent::Json(json.into()))
    }

    pub fn send_frame(&self, frame: SseFrame) -> bool {
        self.send(RawEvent::Frame(frame))
    }
}

/// Single-consumer queue between transports and the reconciler.
#[derive(Debug)]
pub struct EventPump {
    tx: Sender<RawEvent>,
    rx: Option<Receiver<RawEvent>>,
}

impl Default for EventPump {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx: Some(rx) }
    }
}

impl EventPump {
    pub fn sender(&self) -> EventSender {
        EventSender { tx: self.tx.clone() }
    }

    /// Everything queued so far, in arrival order.
    pub fn drain(&self) -> Vec<RawEvent> {
        let Some(rx) = &self.rx else {
            return Vec::new();
        };
        let mut out = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(raw) => out.push(raw),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    /// Drop the receiver; every outstanding sender starts failing.
    pub fn close(&mut self) {
        self.rx.take();
    }

    pub fn is_closed(&self) -> bool {
        self.rx.is_none()
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct PathKitClient {
    config: ClientConfig,
    store: Arc<SnapshotStore>,
    sessions: SessionReconciler,
    pump: EventPump,
    #[cfg(not(target_arch = "wasm32"))]
    poller: Option<crate::poller::PollHandle>,
}

impl PathKitClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            store: Arc::new(SnapshotStore::default()),
            sessions: SessionReconciler::new(),
            pump: EventPump::default(),
            #[cfg(not(target_arch = "wasm32"))]
            poller: None,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<SnapshotStore> {
        Arc::clone(&self.store)
    }

    pub fn snapshot(&self) -> Arc<GraphSnapshot> {
        self.store.load()
    }

    // ─── Topology ───────────────────────────────────────────────────────────

    /// Reload nodes and links from the backend.
    pub fn refresh(&self, backend: &dyn Backend) -> Result<(), BackendError> {
        let nodes = backend.nodes()?;
        let links = backend.links()?;
        tracing::debug!(nodes = nodes.len(), links = links.len(), "topology refreshed");
        self.store.replace(nodes, links);
        Ok(())
    }

    pub fn merge_positions(&self, updates: &[PositionUpdate]) -> usize {
        self.store.merge_positions(updates)
    }

    /// Ask the backend to flip a link, then mirror it locally.
    pub fn toggle_link(&self, backend: &dyn Backend, u: u32, v: u32, enabled: bool) -> Result<bool, BackendError> {
        backend.toggle_link(&ToggleLinkRequest { u, v, enabled })?;
        Ok(self.store.set_link_enabled(u, v, enabled))
    }

    // ─── Metrics and baseline ───────────────────────────────────────────────

    pub fn path_metrics(&self, path: &[u32]) -> PathMetrics {
        path_metrics::path_metrics(path, self.snapshot().as_ref(), &self.config.metrics)
    }

    pub fn hop_breakdown(&self, path: &[u32]) -> (Vec<HopMetrics>, u32) {
        path_metrics::hop_breakdown(path, self.snapshot().as_ref(), &self.config.metrics)
    }

    /// Random-walk baseline over the current enabled links.
    pub fn baseline(&self, src: u32, dst: u32, seed: u64) -> RwrOutcome {
        let snapshot = self.snapshot();
        let adjacency = Adjacency::from_links(snapshot.enabled_links());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        run_rwr(&adjacency, src, dst, &self.config.rwr, &mut rng)
    }

    pub fn request_route(&self, backend: &dyn Backend, src: u32, dst: u32) -> Result<RouteResponse, BackendError> {
        backend.route(&RouteRequest { src, dst })
    }

    /// Start a delivery and register its session with the returned path.
    pub fn send_packet(
        &mut self,
        backend: &dyn Backend,
        req: &SendPacketRequest,
        now_ms: f64,
    ) -> Result<SendPacketResponse, BackendError> {
        let resp = backend.send_packet(req)?;
        self.sessions.create_session(resp.session_id.clone(), resp.path.clone(), now_ms);
        Ok(resp)
    }

    // ─── Sessions ───────────────────────────────────────────────────────────

    pub fn event_sender(&self) -> EventSender {
        self.pump.sender()
    }

    /// Decode and apply everything queued on the pump.
    ///
    /// Items that fail to decode are dropped; they never touch a session.
    pub fn pump_events(&mut self, now_ms: f64) -> Vec<EventOutcome> {
        let mut outcomes = Vec::new();
        for raw in self.pump.drain() {
            outcomes.extend(self.apply_raw(raw, now_ms));
        }
        outcomes
    }

    /// Decode and apply one item without going through the pump.
    ///
    /// Returns `None` when it does not decode; nothing is touched then.
    pub fn apply_raw(&mut self, raw: RawEvent, now_ms: f64) -> Option<EventOutcome> {
        match raw.decode() {
            Ok(event) => Some(self.sessions.handle_event(event, now_ms)),
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed event");
                None
            }
        }
    }

    pub fn handle_event(&mut self, event: PacketEvent, now_ms: f64) -> EventOutcome {
        self.sessions.handle_event(event, now_ms)
    }

    pub fn create_session(&mut self, id: impl Into<String>, path: Option<Path>, now_ms: f64) -> &PacketSession {
        self.sessions.create_session(id, path, now_ms)
    }

    pub fn clear_session(&mut self, id: &str) -> bool {
        self.sessions.clear_session(id)
    }

    pub fn session_view(&self, id: &str) -> Option<SessionView> {
        self.sessions.view(id)
    }

    pub fn session_ids(&self) -> &[String] {
        self.sessions.session_ids()
    }

    pub fn sessions(&self) -> &SessionReconciler {
        &self.sessions
    }

    // ─── Lifecycle ──────────────────────────────────────────────────────────

    /// Poll positions every `poll_interval_ms` on a background thread.
    /// Replaces any poller already running.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn start_polling(&mut self, backend: Arc<dyn Backend>) {
        use crate::poller::{PollHandle, PositionPoller};
        let interval = std::time::Duration::from_millis(self.config.poll_interval_ms);
        let poller = PositionPoller::new(self.store());
        self.poller = Some(PollHandle::spawn(poller, backend, interval));
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn stop_polling(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn stop_polling(&mut self) {}

    /// Stop polling and close the pump. Idempotent.
    pub fn shutdown(&mut self) {
        self.stop_polling();
        if !self.pump.is_closed() {
            tracing::debug!(sessions = self.sessions.len(), "client shut down");
        }
        self.pump.close();
    }

    pub fn is_shut_down(&self) -> bool {
        self.pump.is_closed()
    }
}

impl Drop for PathKitClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Wall-clock milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DeliveryStatus, Link, Node, NodeKind};

    fn client() -> PathKitClient {
        let client = PathKitClient::new(ClientConfig::default()).unwrap();
        client.store.replace(
            vec![
                Node::new(1, NodeKind::Ground, 0.0, 0.0),
                Node::new(2, NodeKind::Ground, 0.0, 0.1),
                Node::new(3, NodeKind::Ground, 0.0, 0.2),
            ],
            vec![Link::new(1, 2), Link::new(2, 3)],
        );
        client
    }

    #[test]
    fn rejects_invalid_config() {
        let config = ClientConfig { poll_interval_ms: 0, ..ClientConfig::default() };
        assert!(PathKitClient::new(config).is_err());
    }

    #[test]
    fn pump_applies_in_order_and_drops_garbage() {
        let mut client = client();
        let tx = client.event_sender();
        assert!(tx.send_json(r#"{"sessionId":"s","nodeId":1,"status":"pending"}"#));
        assert!(tx.send_json("{broken"));
        assert!(tx.send(RawEvent::Decoded(PacketEvent::new("s", 2, DeliveryStatus::Success))));
        assert!(tx.send_frame(SseFrame { event: Some("ping".into()), data: "{}".into() }));

        let outcomes = client.pump_events(0.0);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0], EventOutcome::SessionCreated { session_id: "s".into() });

        let view = client.session_view("s").unwrap();
        assert_eq!(view.path, vec![1, 2]);
        assert!(view.completed);
        assert!(client.pump_events(1.0).is_empty());
    }

    #[test]
    fn malformed_direct_events_are_dropped() {
        let mut client = client();
        assert_eq!(client.apply_raw(RawEvent::Json("{broken".into()), 0.0), None);
        let foreign = r#"{"type":"link-toggled","sessionId":"s","nodeId":1,"status":"pending"}"#;
        assert_eq!(client.apply_raw(RawEvent::Json(foreign.into()), 0.0), None);
        assert!(client.session_ids().is_empty());

        let ok = r#"{"type":"packet-progress","sessionId":"s","nodeId":1,"status":"pending"}"#;
        assert_eq!(
            client.apply_raw(RawEvent::Json(ok.into()), 0.0),
            Some(EventOutcome::SessionCreated { session_id: "s".into() })
        );
        assert_eq!(client.session_ids(), ["s".to_string()]);
    }

    #[test]
    fn baseline_is_reproducible_per_seed() {
        let client = client();
        let a = client.baseline(1, 3, 11);
        let b = client.baseline(1, 3, 11);
        assert_eq!(a, b);
        assert_eq!(a.path, Some(vec![1, 2, 3]));
    }

    #[test]
    fn metrics_follow_the_snapshot() {
        let client = client();
        let metrics = client.path_metrics(&[1, 2, 3]);
        assert_eq!(metrics.hops, 2);
        assert_eq!(metrics.skipped_hops, 0);
        let (hops, skipped) = client.hop_breakdown(&[1, 9, 3]);
        assert!(hops.is_empty());
        assert_eq!(skipped, 2);
    }

    #[test]
    fn shutdown_closes_senders_and_is_idempotent() {
        let mut client = client();
        let tx = client.event_sender();
        client.shutdown();
        client.shutdown();
        assert!(client.is_shut_down());
        assert!(!tx.send_json("{}"));
        assert!(client.pump_events(0.0).is_empty());
    }
}
