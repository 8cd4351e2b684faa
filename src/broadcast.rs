//! Outbound payloads and the dedup emitter
//!
//! Every show/hide/reset decision funnels through `Emitter`, the single
//! point of contact with the WebSocket fan-out. The closed `Payload` variant
//! is serialized to the display-client JSON shape here and nowhere else.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Buffered messages per subscriber before a slow client starts skipping.
pub const CHANNEL_CAPACITY: usize = 64;

/// A display decision, as produced by the display engine and the session
/// controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Show a lyric line
    ShowLine { text: String, sec: f64 },
    /// Show nothing (blank the overlay)
    Hide { sec: f64 },
    /// Track changed: blank the overlay and drop any per-line client state
    Reset,
}

/// Wire shape consumed by display clients.
///
/// An empty `currentLyric` means "show nothing"; `reset: true` additionally
/// tells the client to clear cached per-line animation state.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WirePayload<'a> {
    current_lyric: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_sec: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reset: Option<bool>,
}

impl Payload {
    /// Serialize to the JSON understood by display clients.
    pub fn to_wire_json(&self) -> serde_json::Result<String> {
        let wire = match self {
            Payload::ShowLine { text, sec } => WirePayload {
                current_lyric: text,
                current_sec: Some(*sec),
                reset: None,
            },
            Payload::Hide { sec } => WirePayload {
                current_lyric: "",
                current_sec: Some(*sec),
                reset: None,
            },
            Payload::Reset => WirePayload {
                current_lyric: "",
                current_sec: None,
                reset: Some(true),
            },
        };
        serde_json::to_string(&wire)
    }
}

/// Deduplicating broadcaster.
///
/// Remembers the last wire string it sent and drops byte-identical repeats,
/// so at most one outbound send happens per distinct payload in sequence no
/// matter how many ticks produce the same decision. Constructed once per
/// process; per-subscriber delivery lives in the WebSocket server tasks.
pub struct Emitter {
    last: Option<String>,
    tx: broadcast::Sender<String>,
}

impl Emitter {
    pub fn new(tx: broadcast::Sender<String>) -> Self {
        Self { last: None, tx }
    }

    /// Publish a payload unless it is identical to the previous one.
    ///
    /// A send with no connected subscribers is a no-op, never an error.
    pub fn emit(&mut self, payload: &Payload) {
        let json = match payload.to_wire_json() {
            Ok(json) => json,
            Err(err) => {
                warn!("failed to serialize outbound payload: {}", err);
                return;
            }
        };

        if self.last.as_deref() == Some(json.as_str()) {
            return;
        }

        debug!("broadcasting: {}", json);
        self.last = Some(json.clone());
        if self.tx.send(json).is_err() {
            // No subscribers connected right now; the dedup state still
            // advances so a client connecting later is not replayed stale
            // intermediate payloads.
            debug!("no connected subscribers");
        }
    }
}
