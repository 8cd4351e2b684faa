//! Track session controller
//!
//! Owns everything tied to the currently playing track: its identity, the
//! resolution state of its lyrics, the last seen playback position and the
//! display engine. Processes one engine event at a time; the only async
//! work (the lyric lookup) is handed back to the runtime as a
//! `ResolveRequest` so the controller itself stays synchronous.

use tracing::{debug, info};

use crate::broadcast::{Emitter, Payload};
use crate::events::EngineEvent;
use crate::lyrics::{DisplayEngine, LyricLine};

/// What is known about the current track. Values arrive one OSC message at
/// a time, so either field can be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackIdentity {
    pub title: Option<String>,
    pub artist: Option<String>,
}

/// Lyric resolution state for the current session.
///
/// `Ready(vec![])` is the terminal "told: no lyrics exist" answer and is
/// distinct from `NotRequested`; `Resolving` is the at-most-one-in-flight
/// latch.
#[derive(Debug, Clone, PartialEq)]
enum ResolvedLyrics {
    NotRequested,
    Resolving,
    Ready(Vec<LyricLine>),
}

/// Coarse session phase, derived from the underlying state. Used for logs
/// and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    AwaitingBoth,
    Resolving,
    Ready,
}

/// A lyric lookup the runtime should spawn. Carries the generation current
/// at request time so a late result for a replaced track is discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveRequest {
    pub title: String,
    pub artist: String,
    pub generation: u64,
}

pub struct SessionController {
    identity: TrackIdentity,
    lyrics: ResolvedLyrics,
    generation: u64,
    current_sec: Option<f64>,
    display: DisplayEngine,
    emitter: Emitter,
}

impl SessionController {
    pub fn new(emitter: Emitter, max_display_sec: f64) -> Self {
        Self {
            identity: TrackIdentity::default(),
            lyrics: ResolvedLyrics::NotRequested,
            generation: 0,
            current_sec: None,
            display: DisplayEngine::new(max_display_sec),
            emitter,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        match &self.lyrics {
            ResolvedLyrics::Resolving => SessionPhase::Resolving,
            ResolvedLyrics::Ready(_) => SessionPhase::Ready,
            ResolvedLyrics::NotRequested => {
                if self.identity.title.is_none() && self.identity.artist.is_none() {
                    SessionPhase::Idle
                } else {
                    SessionPhase::AwaitingBoth
                }
            }
        }
    }

    /// Process one event. Returns a lookup for the runtime to spawn when a
    /// resolution becomes due.
    pub fn handle(&mut self, event: EngineEvent) -> Option<ResolveRequest> {
        match event {
            EngineEvent::Title(title) => {
                self.on_title(title);
                None
            }
            EngineEvent::Artist(artist) => {
                self.on_artist(artist);
                None
            }
            EngineEvent::Tick(sec) => self.on_tick(sec),
            EngineEvent::Resolved { generation, lines } => {
                self.on_resolved(generation, lines);
                None
            }
        }
    }

    fn on_title(&mut self, title: String) {
        if self.identity.title.as_deref() != Some(title.as_str()) {
            info!("track changed: {:?}", title);
            self.reset_session();
        }
        self.identity.title = Some(title);
    }

    fn on_artist(&mut self, artist: String) {
        // The session resets on artist changes as well as title changes.
        if self.identity.artist.as_deref() != Some(artist.as_str()) {
            info!("track artist changed: {:?}", artist);
            self.reset_session();
        }
        self.identity.artist = Some(artist);
    }

    fn on_tick(&mut self, sec: f64) -> Option<ResolveRequest> {
        self.current_sec = Some(sec);

        let request = match (&self.lyrics, &self.identity.title, &self.identity.artist) {
            (ResolvedLyrics::NotRequested, Some(title), Some(artist)) => {
                info!("requesting lyrics: {:?} by {:?}", title, artist);
                self.lyrics = ResolvedLyrics::Resolving;
                Some(ResolveRequest {
                    title: title.clone(),
                    artist: artist.clone(),
                    generation: self.generation,
                })
            }
            _ => None,
        };

        self.drive_display(sec);
        request
    }

    fn on_resolved(&mut self, generation: u64, lines: Vec<LyricLine>) {
        if generation != self.generation {
            debug!(
                "discarding lyrics for a replaced track (generation {} != {})",
                generation, self.generation
            );
            return;
        }

        if lines.is_empty() {
            // Terminal for this session: one blank broadcast, no retries.
            info!("no lyrics for current track");
            self.lyrics = ResolvedLyrics::Ready(Vec::new());
            self.display.reset();
            self.emitter.emit(&Payload::Hide {
                sec: self.current_sec.unwrap_or(0.0),
            });
            return;
        }

        info!("lyrics ready: {} lines", lines.len());
        self.lyrics = ResolvedLyrics::Ready(lines);
        if let Some(sec) = self.current_sec {
            self.drive_display(sec);
        }
    }

    /// Feed the display engine and publish its decision, when lyrics exist.
    fn drive_display(&mut self, sec: f64) {
        if let ResolvedLyrics::Ready(lines) = &self.lyrics {
            if !lines.is_empty() {
                if let Some(payload) = self.display.tick(sec, lines) {
                    self.emitter.emit(&payload);
                }
            }
        }
    }

    /// Full reset on track change: derived state is dropped, the other
    /// identity field is kept (the controller re-announces whichever field
    /// actually changed right after this).
    fn reset_session(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.lyrics = ResolvedLyrics::NotRequested;
        self.current_sec = None;
        self.display.reset();
        self.emitter.emit(&Payload::Reset);
        debug!("session reset, now {:?}", self.phase());
    }
}
