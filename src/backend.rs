// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Backend Contract

//! Request/response shapes of the simulator backend and the [`Backend`]
//! trait the host implements over its HTTP transport.
//!
//! The backend owns the authoritative graph and the route optimizer. Nothing
//! here retries: every failure is returned to the caller, and an HTTP 422
//! from `/route` or `/simulate/send-packet` maps to
//! [`BackendError::NoFeasiblePath`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::types::{Link, Node, Path, PositionUpdate};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("no feasible path: {0}")]
    NoFeasiblePath(String),

    #[error("backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BackendError {
    pub fn is_no_feasible_path(&self) -> bool {
        matches!(self, Self::NoFeasiblePath(_))
    }
}

/// Map a raw HTTP status and body to success or a typed error.
pub fn check_status(status: u16, body: &str) -> Result<(), BackendError> {
    match status {
        200..=299 => Ok(()),
        422 => Err(BackendError::NoFeasiblePath(error_detail(body))),
        _ => Err(BackendError::Http { status, body: body.to_string() }),
    }
}

/// Check the status, then decode the JSON body.
pub fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, BackendError> {
    check_status(status, body)?;
    Ok(serde_json::from_str(body)?)
}

/// Pull `detail` out of a FastAPI-style error body, else use the body as-is.
fn error_detail(body: &str) -> String {
    #[derive(Deserialize)]
    struct Detail {
        detail: String,
    }
    serde_json::from_str::<Detail>(body)
        .map(|d| d.detail)
        .unwrap_or_else(|_| body.to_string())
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub src: u32,
    pub dst: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResponse {
    pub path: Path,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub throughput_mbps: Option<f64>,
}

fn default_protocol() -> String {
    "UDP".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendPacketRequest {
    pub src: u32,
    pub dst: u32,
    #[serde(default = "default_protocol")]
    pub protocol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SendPacketRequest {
    pub fn new(src: u32, dst: u32) -> Self {
        Self { src, dst, protocol: default_protocol(), message: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendPacketResponse {
    #[serde(rename = "sessionId", alias = "session_id")]
    pub session_id: String,
    #[serde(default)]
    pub path: Option<Path>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub throughput_mbps: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSetting {
    pub multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetSpeedResponse {
    pub ok: bool,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleLinkRequest {
    pub u: u32,
    pub v: u32,
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Blocking view of the simulator backend, implemented by the host.
pub trait Backend: Send + Sync {
    /// `GET /nodes`
    fn nodes(&self) -> Result<Vec<Node>, BackendError>;
    /// `GET /links`
    fn links(&self) -> Result<Vec<Link>, BackendError>;
    /// `POST /route`
    fn route(&self, req: &RouteRequest) -> Result<RouteResponse, BackendError>;
    /// `POST /simulate/send-packet`
    fn send_packet(&self, req: &SendPacketRequest) -> Result<SendPacketResponse, BackendError>;
    /// `GET /nodes/positions`
    fn positions(&self) -> Result<Vec<PositionUpdate>, BackendError>;
    /// `GET /simulate/get-speed`
    fn speed(&self) -> Result<SpeedSetting, BackendError>;
    /// `POST /simulate/set-speed`
    fn set_speed(&self, setting: SpeedSetting) -> Result<SetSpeedResponse, BackendError>;
    /// `POST /simulate/toggle-link`
    fn toggle_link(&self, req: &ToggleLinkRequest) -> Result<(), BackendError>;
}
