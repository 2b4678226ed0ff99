//! Routing of inbound application messages. The hub makes no content-level
//! decisions here: `addr` is shuffled and opportunistically mined for new
//! outbound candidates when the swarm is below `min_outgoing_connections`,
//! and everything else is forwarded to whichever subscriber the
//! application layer wired up, unparsed beyond its already-decoded
//! `Payload` shape.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tokio::sync::mpsc;
use tracing::trace;

use crate::address::AddrEntry;
use crate::config::NodeSettings;
use crate::message::{GetHeadersPayload, HeadersPayload, InventoryPayload, Payload, RejectPayload};
use crate::session::ConnectionType;

use super::connector::ConnectRequest;
use super::sessions::SessionRegistry;

/// One inbound application message, tagged with the session it arrived on.
/// This is what the hub hands to the application layer once it has decided
/// a payload isn't its own business (handshake/ping/pong never reach here —
/// the session absorbs those itself).
#[derive(Debug, Clone)]
pub enum RoutedMessage {
    Addr { session: u64, entries: Vec<AddrEntry> },
    GetHeaders { session: u64, payload: GetHeadersPayload },
    Inv { session: u64, payload: InventoryPayload },
    GetData { session: u64, payload: InventoryPayload },
    NotFound { session: u64, payload: InventoryPayload },
    Headers { session: u64, payload: HeadersPayload },
    Reject { session: u64, payload: RejectPayload },
    MemPool { session: u64 },
    GetAddr { session: u64 },
}

/// How many addresses from one `addr` message get opportunistically fed to
/// the connector when the swarm is short of outgoing connections.
const MAX_OPPORTUNISTIC_CANDIDATES: usize = 8;

/// Dispatches one decoded, non-handshake payload. Returns without doing
/// anything if the application-layer sink has been dropped (the hub is
/// shutting down and nobody is listening anymore).
pub async fn route(
    session_id: u64,
    payload: Payload,
    registry: &Arc<SessionRegistry>,
    settings: &Arc<NodeSettings>,
    connect_tx: &mpsc::Sender<ConnectRequest>,
    routed_tx: &mpsc::Sender<RoutedMessage>,
) {
    match payload {
        Payload::Addr(addr) => {
            let mut entries = addr.0;
            entries.shuffle(&mut rand::thread_rng());

            if registry.active_outbound_count() < settings.min_outgoing_connections {
                feed_opportunistic_candidates(&entries, connect_tx).await;
            }

            let _ = routed_tx
                .send(RoutedMessage::Addr { session: session_id, entries })
                .await;
        }
        Payload::GetHeaders(payload) => {
            let _ = routed_tx
                .send(RoutedMessage::GetHeaders { session: session_id, payload })
                .await;
        }
        Payload::Inv(payload) => {
            let _ = routed_tx.send(RoutedMessage::Inv { session: session_id, payload }).await;
        }
        Payload::GetData(payload) => {
            let _ = routed_tx
                .send(RoutedMessage::GetData { session: session_id, payload })
                .await;
        }
        Payload::NotFound(payload) => {
            let _ = routed_tx
                .send(RoutedMessage::NotFound { session: session_id, payload })
                .await;
        }
        Payload::Headers(payload) => {
            let _ = routed_tx
                .send(RoutedMessage::Headers { session: session_id, payload })
                .await;
        }
        Payload::Reject(payload) => {
            let _ = routed_tx
                .send(RoutedMessage::Reject { session: session_id, payload })
                .await;
        }
        Payload::MemPool(_) => {
            let _ = routed_tx.send(RoutedMessage::MemPool { session: session_id }).await;
        }
        Payload::GetAddr(_) => {
            let _ = routed_tx.send(RoutedMessage::GetAddr { session: session_id }).await;
        }
        Payload::Version(_) | Payload::VerAck(_) | Payload::Ping(_) | Payload::Pong(_) => {
            trace!(session = session_id, "handshake/liveness tag reached routing; ignoring");
        }
    }
}

async fn feed_opportunistic_candidates(
    entries: &[AddrEntry],
    connect_tx: &mpsc::Sender<ConnectRequest>,
) {
    for entry in entries.iter().take(MAX_OPPORTUNISTIC_CANDIDATES) {
        if !entry.endpoint.address.is_routable() {
            continue;
        }
        let request = ConnectRequest {
            addr: std::net::SocketAddr::new(entry.endpoint.address.to_ip(), entry.endpoint.port),
            connection_type: ConnectionType::Outbound,
        };
        let _ = connect_tx.try_send(request);
    }
}
