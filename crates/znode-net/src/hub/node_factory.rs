//! Node factory. Drains the channel both the acceptor and the connector
//! feed, re-checks the global cap (a session built just before the cap was
//! hit by a competing accept must still be rejected here), wraps the socket
//! in a `PeerSession`, starts its pumps, and registers it. Removal from the
//! registry happens later, when the session's `HubEvent::Disconnected`
//! reaches the hub's own event loop — the factory's job ends at "started
//! and registered."

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::address::Endpoint;
use crate::config::{socket_addr_to_endpoint, NodeSettings};
use crate::session::{self, ConnectionType, HubEvent, PeerSession, SessionConfig, TlsRoles};

use super::sessions::SessionRegistry;
use super::NodeFactoryJob;

pub async fn run(
    mut jobs_rx: mpsc::Receiver<NodeFactoryJob>,
    settings: Arc<NodeSettings>,
    session_config: Arc<SessionConfig>,
    registry: Arc<SessionRegistry>,
    tls_roles: Option<TlsRoles>,
    hub_tx: mpsc::Sender<HubEvent>,
    local_endpoint: Endpoint,
) {
    while let Some(job) = jobs_rx.recv().await {
        if registry.len() >= settings.max_active_connections {
            registry.mark_rejected();
            continue;
        }

        let (stream, remote_addr, connection_type) = match job {
            NodeFactoryJob::Inbound { stream, addr } => (stream, addr, ConnectionType::Inbound),
            NodeFactoryJob::Outbound { stream, addr, connection_type } => {
                (stream, addr, connection_type)
            }
        };

        let remote_endpoint = socket_addr_to_endpoint(remote_addr);
        let session = PeerSession::new(
            connection_type,
            local_endpoint,
            remote_endpoint,
            Arc::clone(&session_config),
        );
        info!(
            session = session.id(),
            remote = %remote_endpoint,
            ?connection_type,
            "session starting"
        );
        registry.insert(Arc::clone(&session));
        session::spawn(session, stream, tls_roles.clone(), hub_tx.clone());
    }
}
