//! Engine event stream types
//!
//! A single unbounded channel carries every event that can mutate session
//! state, so the controller processes them one at a time in arrival order:
//!
//! ```text
//! OSC listener  --[Title/Artist/Tick]-->  event loop (SessionController)
//! resolver task --[Resolved]----------->  event loop
//! ```

use crate::lyrics::LyricLine;

/// One event on the engine stream.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Track title announced by the controller (brackets already stripped)
    Title(String),
    /// Track artist announced by the controller (brackets already stripped)
    Artist(String),
    /// Playback position update, in seconds
    Tick(f64),
    /// A lyric resolution finished. `generation` is the session generation
    /// the request was issued under; stale results are discarded.
    Resolved {
        generation: u64,
        lines: Vec<LyricLine>,
    },
}

/// Sender half of the engine event stream (held by the OSC listener and by
/// in-flight resolver tasks)
pub type EngineEventSender = tokio::sync::mpsc::UnboundedSender<EngineEvent>;

/// Receiver half of the engine event stream (held by the event loop)
pub type EngineEventReceiver = tokio::sync::mpsc::UnboundedReceiver<EngineEvent>;

/// Create a new engine event channel
pub fn engine_event_channel() -> (EngineEventSender, EngineEventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}
