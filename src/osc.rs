//! Inbound OSC listener
//!
//! Decodes track/time events from the external controller and forwards the
//! three addresses the engine cares about onto the event stream. Everything
//! else is dropped here: malformed datagrams, non-numeric time ticks, the
//! high-rate `/beat...` family.

use anyhow::Result;
use rosc::{OscMessage, OscPacket, OscType};
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::events::{EngineEvent, EngineEventSender};

/// Title and artist values arrive wrapped in bracket delimiters.
const TRACK_TITLE_ADDR: &str = "/track/master/title";
const TRACK_ARTIST_ADDR: &str = "/track/master/artist";
const TIME_ADDR: &str = "/time";

/// Bind the UDP socket and pump decoded events into the engine stream.
/// Runs until the process exits.
pub async fn listen(port: u16, events: EngineEventSender) -> Result<()> {
    let socket = UdpSocket::bind(("0.0.0.0", port)).await?;
    info!("OSC listener bound on port {}", port);

    let mut buf = vec![0u8; 8192];
    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(err) => {
                warn!("OSC receive failed: {}", err);
                continue;
            }
        };

        match rosc::decoder::decode_udp(&buf[..len]) {
            Ok((_, packet)) => dispatch_packet(packet, &events),
            Err(err) => debug!("dropping undecodable OSC packet from {}: {:?}", peer, err),
        }
    }
}

/// Bundles are walked recursively; their timetags are ignored, the engine
/// orders everything by arrival.
fn dispatch_packet(packet: OscPacket, events: &EngineEventSender) {
    match packet {
        OscPacket::Message(message) => dispatch_message(message, events),
        OscPacket::Bundle(bundle) => {
            for inner in bundle.content {
                dispatch_packet(inner, events);
            }
        }
    }
}

fn dispatch_message(message: OscMessage, events: &EngineEventSender) {
    let event = match message.addr.as_str() {
        TRACK_TITLE_ADDR => first_string(&message.args)
            .map(|value| EngineEvent::Title(strip_brackets(&value).to_string())),
        TRACK_ARTIST_ADDR => first_string(&message.args)
            .map(|value| EngineEvent::Artist(strip_brackets(&value).to_string())),
        TIME_ADDR => match first_seconds(&message.args) {
            Some(sec) => Some(EngineEvent::Tick(sec)),
            None => {
                warn!(
                    "dropping /time tick with non-numeric argument: {:?}",
                    message.args
                );
                None
            }
        },
        addr if addr.starts_with("/beat") => None,
        addr => {
            debug!("unhandled OSC address: {} {:?}", addr, message.args.first());
            None
        }
    };

    if let Some(event) = event {
        // The receiver only disappears at shutdown.
        let _ = events.send(event);
    }
}

/// First argument as a string, when it is one.
fn first_string(args: &[OscType]) -> Option<String> {
    match args.first() {
        Some(OscType::String(value)) => Some(value.clone()),
        other => {
            warn!("expected a string OSC argument, got {:?}", other);
            None
        }
    }
}

/// First argument as finite seconds. Accepts the numeric OSC types plus a
/// bracket-wrapped numeric string, which is how the controller sends `/time`.
fn first_seconds(args: &[OscType]) -> Option<f64> {
    let sec = match args.first()? {
        OscType::Float(value) => f64::from(*value),
        OscType::Double(value) => *value,
        OscType::Int(value) => f64::from(*value),
        OscType::Long(value) => *value as f64,
        OscType::String(value) => strip_brackets(value).parse().ok()?,
        _ => return None,
    };
    sec.is_finite().then_some(sec)
}

/// Strip the single pair of bracket delimiters some controllers wrap values
/// in: `[Artist Name]` → `Artist Name`.
fn strip_brackets(raw: &str) -> &str {
    let stripped = raw.strip_prefix('[').unwrap_or(raw);
    stripped.strip_suffix(']').unwrap_or(stripped)
}
