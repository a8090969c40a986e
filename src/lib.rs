// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Path Metrics and Delivery Session Engine

pub mod types;
pub mod geodesy;
pub mod link_budget;
pub mod path_metrics;
pub mod rwr;
pub mod session;
pub mod events;
pub mod snapshot;
pub mod poller;
pub mod backend;
pub mod config;
pub mod client;

pub use types::*;
pub use backend::{Backend, BackendError};
pub use client::{EventSender, PathKitClient, RawEvent};
pub use config::{ClientConfig, ConfigError};
pub use events::{decode_event, DecodeError, SseDecoder, SseFrame};
pub use path_metrics::{HopMetrics, MetricsParams, NodeLookup};
pub use rwr::{RwrOutcome, RwrParams};
pub use session::{EventOutcome, SessionReconciler, SessionView};
pub use snapshot::{GraphSnapshot, SnapshotStore};

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::events::WireEvent;
use crate::link_budget::RadioParams;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn is_absent(value: &JsValue) -> bool {
    value.is_null() || value.is_undefined()
}

#[derive(Serialize)]
struct HopBreakdown {
    hops: Vec<HopMetrics>,
    skipped_hops: u32,
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
pub struct PathKit {
    inner: PathKitClient,
}

#[wasm_bindgen]
impl PathKit {
    /// `config` is a partial `ClientConfig` object, or null for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<PathKit, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config: ClientConfig = if is_absent(&config) {
            ClientConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let inner = PathKitClient::new(config).map_err(js_error)?;
        Ok(Self { inner })
    }

    pub fn set_nodes(&mut self, nodes: JsValue) -> Result<(), JsValue> {
        let nodes: Vec<Node> = serde_wasm_bindgen::from_value(nodes)?;
        self.inner.store().replace_nodes(nodes);
        Ok(())
    }

    pub fn set_links(&mut self, links: JsValue) -> Result<(), JsValue> {
        let links: Vec<Link> = serde_wasm_bindgen::from_value(links)?;
        self.inner.store().replace_links(links);
        Ok(())
    }

    /// Host timer entry point for `GET /nodes/positions` results.
    pub fn merge_positions(&mut self, updates: JsValue) -> Result<u32, JsValue> {
        let updates: Vec<PositionUpdate> = serde_wasm_bindgen::from_value(updates)?;
        Ok(self.inner.merge_positions(&updates) as u32)
    }

    pub fn set_link_enabled(&mut self, u: u32, v: u32, enabled: bool) -> bool {
        self.inner.store().set_link_enabled(u, v, enabled)
    }

    pub fn get_snapshot(&self) -> JsValue {
        to_js(self.inner.snapshot().as_ref())
    }

    // metrics

    pub fn path_metrics(&self, path: Vec<u32>) -> JsValue {
        to_js(&self.inner.path_metrics(&path))
    }

    pub fn path_latency_ms(&self, path: Vec<u32>) -> f64 {
        if path.len() < 2 {
            return 0.0;
        }
        self.inner.path_metrics(&path).latency_ms
    }

    pub fn path_throughput_bps(&self, path: Vec<u32>) -> f64 {
        self.inner.path_metrics(&path).throughput_bps
    }

    pub fn hop_breakdown(&self, path: Vec<u32>) -> JsValue {
        let (hops, skipped_hops) = self.inner.hop_breakdown(&path);
        to_js(&HopBreakdown { hops, skipped_hops })
    }

    pub fn run_rwr(&self, src: u32, dst: u32, seed: u32) -> JsValue {
        to_js(&self.inner.baseline(src, dst, u64::from(seed)))
    }

    // sessions

    pub fn create_session(&mut self, id: String, path: JsValue, now_ms: f64) -> Result<JsValue, JsValue> {
        let path: Option<Path> = if is_absent(&path) {
            None
        } else {
            Some(serde_wasm_bindgen::from_value(path)?)
        };
        let view = self.inner.create_session(id, path, now_ms).view();
        Ok(to_js(&view))
    }

    /// Apply one event object as delivered by the host's EventSource.
    ///
    /// Returns `null` for anything that is not a well-formed packet event.
    pub fn handle_event(&mut self, event: JsValue, now_ms: f64) -> JsValue {
        let wire: WireEvent = match serde_wasm_bindgen::from_value(event) {
            Ok(wire) => wire,
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed event");
                return JsValue::NULL;
            }
        };
        match PacketEvent::try_from(wire) {
            Ok(event) => to_js(&self.inner.handle_event(event, now_ms)),
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed event");
                JsValue::NULL
            }
        }
    }

    pub fn handle_event_json(&mut self, json: &str, now_ms: f64) -> JsValue {
        match self.inner.apply_raw(RawEvent::Json(json.to_owned()), now_ms) {
            Some(outcome) => to_js(&outcome),
            None => JsValue::NULL,
        }
    }

    pub fn clear_session(&mut self, id: &str) -> bool {
        self.inner.clear_session(id)
    }

    pub fn session_view(&self, id: &str) -> JsValue {
        match self.inner.session_view(id) {
            Some(view) => to_js(&view),
            None => JsValue::NULL,
        }
    }

    pub fn session_ids(&self) -> JsValue {
        to_js(self.inner.session_ids())
    }

    pub fn shutdown(&mut self) {
        self.inner.shutdown();
    }
}

// ─── Free functions ──────────────────────────────────────────────────────────

/// Surface distance in metres.
#[wasm_bindgen]
pub fn great_circle_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    geodesy::great_circle_distance(lat1, lon1, lat2, lon2)
}

/// Straight-line distance in metres; a missing altitude counts as 0.
#[wasm_bindgen]
pub fn slant_range_m(lat1: f64, lon1: f64, alt1_m: Option<f64>, lat2: f64, lon2: f64, alt2_m: Option<f64>) -> f64 {
    geodesy::slant_range(lat1, lon1, alt1_m, lat2, lon2, alt2_m)
}

/// Effective link rate in bps at `distance_m` with default radio parameters.
#[wasm_bindgen]
pub fn link_capacity_bps(distance_m: f64) -> f64 {
    link_budget::effective_capacity_bps(distance_m, &RadioParams::default())
}
