//! Manual node supervision. `connect_nodes` are the one class of outbound
//! candidate the hub retries on its own behalf: a user who explicitly named
//! a peer expects it to be reconnected if briefly unreachable, unlike an
//! opportunistic address-book or DNS-seed candidate, which the hub is free
//! to simply drop and try a different one of instead.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::constants::MANUAL_RECONNECT_INTERVAL_SECONDS;
use crate::session::ConnectionType;

use super::connector::ConnectRequest;
use super::sessions::SessionRegistry;

pub async fn run(
    manual_endpoints: Vec<SocketAddr>,
    registry: Arc<SessionRegistry>,
    connect_tx: mpsc::Sender<ConnectRequest>,
) {
    if manual_endpoints.is_empty() {
        return;
    }
    let mut ticker = tokio::time::interval(Duration::from_secs(MANUAL_RECONNECT_INTERVAL_SECONDS));
    loop {
        ticker.tick().await;
        for addr in &manual_endpoints {
            if registry.has_running_session_for_ip(addr.ip()) {
                continue;
            }
            let _ = connect_tx
                .send(ConnectRequest { addr: *addr, connection_type: ConnectionType::Manual })
                .await;
        }
    }
}
