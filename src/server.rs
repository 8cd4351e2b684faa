//! Outbound WebSocket fan-out
//!
//! Display clients connect here and receive every payload published by the
//! dedup emitter. Fan-out is best-effort: a slow client skips messages it
//! lagged past, a dead client tears down only its own tasks.

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::sync::broadcast;
use tracing::{debug, info};

#[derive(Clone)]
struct AppState {
    payload_tx: broadcast::Sender<String>,
}

/// Serve the display-client WebSocket endpoint until the process exits.
pub async fn serve(port: u16, payload_tx: broadcast::Sender<String>) -> Result<()> {
    let state = AppState { payload_tx };

    let app = Router::new()
        .route("/", get(handle_upgrade))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind WebSocket port {port}"))?;
    info!("WebSocket server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("WebSocket server terminated")
}

async fn handle_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_client(socket, state))
}

/// Forward broadcast payloads to one client until either side goes away.
async fn handle_client(socket: WebSocket, state: AppState) {
    info!("display client connected");
    let (mut sink, mut stream) = socket.split();
    let mut payload_rx = state.payload_tx.subscribe();

    let mut send_task = tokio::spawn(async move {
        loop {
            match payload_rx.recv().await {
                Ok(payload) => {
                    if sink.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Only the latest line matters for an overlay, so a slow
                    // client just skips ahead.
                    debug!("display client lagged, skipped {} messages", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Inbound frames are ignored; reading just surfaces disconnects early.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(frame)) = stream.next().await {
            if let Message::Close(_) = frame {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    info!("display client disconnected");
}
