//! lyricast - real-time lyric overlay daemon
//!
//! Listens for OSC playback events from an external controller, resolves
//! line-synced lyrics for the current track and pushes the active line to
//! WebSocket display clients.

mod broadcast;
mod events;
mod lyrics;
mod osc;
mod server;
mod session;
mod settings;

use anyhow::Result;
use tokio::sync::broadcast as broadcast_channel;
use tracing::{error, info, warn};

use crate::broadcast::{CHANNEL_CAPACITY, Emitter};
use crate::events::{EngineEvent, engine_event_channel};
use crate::lyrics::LyricResolver;
use crate::session::SessionController;
use crate::settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let settings = Settings::load();
    // Write a template on first run so the knobs are discoverable.
    if let Some(path) = Settings::file_path() {
        if !path.exists() {
            if let Err(err) = settings.save_to_file(&path) {
                warn!("failed to write default settings file: {}", err);
            }
        }
    }
    info!(
        "starting lyricast (OSC port {}, WebSocket port {})",
        settings.osc_port, settings.ws_port
    );

    let (event_tx, mut event_rx) = engine_event_channel();
    let (payload_tx, _) = broadcast_channel::channel(CHANNEL_CAPACITY);

    let resolver = LyricResolver::new(settings.lyrics_cache_dir());
    let mut session =
        SessionController::new(Emitter::new(payload_tx.clone()), settings.max_display_sec);

    // Transports run on their own tasks; either failing is logged but does
    // not take down tick processing on the other.
    {
        let payload_tx = payload_tx.clone();
        let ws_port = settings.ws_port;
        tokio::spawn(async move {
            if let Err(err) = server::serve(ws_port, payload_tx).await {
                error!("WebSocket server stopped: {:#}", err);
            }
        });
    }
    {
        let event_tx = event_tx.clone();
        let osc_port = settings.osc_port;
        tokio::spawn(async move {
            if let Err(err) = osc::listen(osc_port, event_tx).await {
                error!("OSC listener stopped: {:#}", err);
            }
        });
    }

    // Single logical stream: every state change happens here, one event at
    // a time, in arrival order.
    while let Some(event) = event_rx.recv().await {
        if let Some(request) = session.handle(event) {
            let resolver = resolver.clone();
            let event_tx = event_tx.clone();
            tokio::spawn(async move {
                let lines = match resolver.resolve(&request.title, &request.artist).await {
                    Ok(lines) => lines,
                    Err(err) => {
                        // Degrade to the terminal "no lyrics" result.
                        warn!("lyric resolution failed for {:?}: {}", request.title, err);
                        Vec::new()
                    }
                };
                let _ = event_tx.send(EngineEvent::Resolved {
                    generation: request.generation,
                    lines,
                });
            });
        }
    }

    Ok(())
}
