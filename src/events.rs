// Copyright 2026 Hypermesh Foundation. All rights reserved.
// SAGSIN PathKit - Event Stream Decoding

//! Decoding of the backend's `GET /events` stream.
//!
//! The backend emits Server-Sent Events frames whose `data:` line is a JSON
//! object. Field names arrive in either snake_case or camelCase; both are
//! normalized here, once, into the canonical [`PacketEvent`]:
//!
//! ```text
//! session_id             string   (sessionId)
//! node_id                u32      (nodeId)
//! status                 "pending" | "success"
//! arrived_ms             f64?     (arrivedMs)
//! cumulative_latency_ms  f64?     (cumulativeLatencyMs)
//! message                string?
//! type                   string?  must be "packet-progress" when present
//! ```

use serde::Deserialize;

use crate::types::{DeliveryStatus, PacketEvent};

/// SSE event name and JSON `type` value carried by delivery events.
pub const PACKET_PROGRESS: &str = "packet-progress";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed event payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a packet-progress event: {0}")]
    UnexpectedType(String),

    #[error("frame carries no data")]
    EmptyFrame,
}

// ---------------------------------------------------------------------------
// Wire schema
// ---------------------------------------------------------------------------

/// Event as it appears on the wire, before normalization.
#[derive(Debug, Deserialize)]
pub struct WireEvent {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(alias = "sessionId")]
    session_id: String,
    #[serde(alias = "nodeId")]
    node_id: u32,
    status: DeliveryStatus,
    #[serde(default, alias = "arrivedMs")]
    arrived_ms: Option<f64>,
    #[serde(default, alias = "cumulativeLatencyMs")]
    cumulative_latency_ms: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

impl TryFrom<WireEvent> for PacketEvent {
    type Error = DecodeError;

    fn try_from(wire: WireEvent) -> Result<Self, Self::Error> {
        match wire.kind {
            Some(kind) if kind != PACKET_PROGRESS => Err(DecodeError::UnexpectedType(kind)),
            _ => Ok(PacketEvent {
                session_id: wire.session_id,
                node_id: wire.node_id,
                status: wire.status,
                arrived_ms: wire.arrived_ms,
                cumulative_latency_ms: wire.cumulative_latency_ms,
                message: wire.message,
            }),
        }
    }
}

/// Decode one JSON event object into canonical form.
pub fn decode_event(json: &str) -> Result<PacketEvent, DecodeError> {
    let wire: WireEvent = serde_json::from_str(json)?;
    PacketEvent::try_from(wire)
}

/// Decode an already-parsed JSON value.
pub fn decode_value(value: serde_json::Value) -> Result<PacketEvent, DecodeError> {
    let wire: WireEvent = serde_json::from_value(value)?;
    PacketEvent::try_from(wire)
}

// ---------------------------------------------------------------------------
// SSE framing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SseFrame {
    /// Value of the `event:` field, if any.
    pub event: Option<String>,
    /// `data:` lines joined with `\n`.
    pub data: String,
}

impl SseFrame {
    /// Decode this frame as a delivery event.
    pub fn decode(&self) -> Result<PacketEvent, DecodeError> {
        if let Some(name) = &self.event {
            if name != PACKET_PROGRESS && name != "message" {
                return Err(DecodeError::UnexpectedType(name.clone()));
            }
        }
        if self.data.trim().is_empty() {
            return Err(DecodeError::EmptyFrame);
        }
        decode_event(&self.data)
    }
}

/// Incremental SSE parser. Feed it raw chunks as they arrive; it yields
/// every frame completed by a blank line.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &str) -> Vec<SseFrame> {
        self.buffer.push_str(chunk);
        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            let line = line.trim_end_matches(&['\n', '\r'][..]);
            if let Some(frame) = self.feed_line(line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn feed_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            if self.data.is_empty() && self.event.is_none() {
                return None;
            }
            let frame = SseFrame { event: self.event.take(), data: self.data.join("\n") };
            self.data.clear();
            return Some(frame);
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id / retry are not used by this stream
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_payload_is_normalized() {
        let event = decode_event(
            r#"{"type":"packet-progress","status":"success","sessionId":"abc","nodeId":7,"cumulativeLatencyMs":12.5,"arrivedMs":1700000000000}"#,
        )
        .unwrap();
        assert_eq!(event.session_id, "abc");
        assert_eq!(event.node_id, 7);
        assert_eq!(event.status, DeliveryStatus::Success);
        assert_eq!(event.cumulative_latency_ms, Some(12.5));
        assert_eq!(event.arrived_ms, Some(1.7e12));
    }

    #[test]
    fn snake_case_payload_without_type() {
        let event = decode_event(
            r#"{"session_id":"s","node_id":3,"status":"pending","cumulative_latency_ms":0.0,"message":null}"#,
        )
        .unwrap();
        assert_eq!(event, PacketEvent::new("s", 3, DeliveryStatus::Pending).with_latency(0.0));
    }

    #[test]
    fn other_event_types_are_rejected() {
        let err = decode_event(r#"{"type":"link-toggled","sessionId":"s","nodeId":1,"status":"pending"}"#);
        assert!(matches!(err, Err(DecodeError::UnexpectedType(t)) if t == "link-toggled"));
    }

    #[test]
    fn malformed_payloads_are_errors() {
        assert!(matches!(decode_event("not json"), Err(DecodeError::Json(_))));
        assert!(matches!(decode_event(r#"{"sessionId":"s","status":"pending"}"#), Err(DecodeError::Json(_))));
        assert!(matches!(
            decode_event(r#"{"sessionId":"s","nodeId":1,"status":"lost"}"#),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn sse_frames_across_chunk_boundaries() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(":ok\n\n").is_empty());
        assert!(decoder.push("event: packet-progress\r\ndata: {\"sessionId\":\"s\",").is_empty());
        let frames = decoder.push("\"nodeId\":2,\"status\":\"success\"}\r\n\r\n:keepalive\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("packet-progress"));

        let event = frames[0].decode().unwrap();
        assert_eq!(event.node_id, 2);
        assert_eq!(event.status, DeliveryStatus::Success);
    }

    #[test]
    fn multi_line_data_is_joined() {
        let mut decoder = SseDecoder::new();
        let frames = decoder.push("data: {\"sessionId\":\"s\",\ndata: \"nodeId\":4,\"status\":\"pending\"}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, None);
        assert_eq!(frames[0].decode().unwrap().node_id, 4);
    }

    #[test]
    fn empty_and_foreign_frames() {
        let frame = SseFrame { event: Some("packet-progress".into()), data: String::new() };
        assert!(matches!(frame.decode(), Err(DecodeError::EmptyFrame)));
        let frame = SseFrame { event: Some("heartbeat".into()), data: "{}".into() };
        assert!(matches!(frame.decode(), Err(DecodeError::UnexpectedType(_))));
    }
}
