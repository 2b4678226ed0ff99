//! The need-connections signal: whenever `current_active_outbound_connections`
//! drops below `min_outgoing_connections`, re-feeds the connector from DNS
//! seeds. Runs once immediately at startup, then again every time something
//! notifies it, so long as the swarm is still below the floor.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Notify};

use crate::config::{ChainParams, NodeSettings};
use crate::session::ConnectionType;

use super::connector::ConnectRequest;
use super::dns;
use super::sessions::SessionRegistry;

pub async fn run(
    chain: Arc<ChainParams>,
    settings: Arc<NodeSettings>,
    registry: Arc<SessionRegistry>,
    connect_tx: mpsc::Sender<ConnectRequest>,
    need_connections: Arc<Notify>,
    dns_attempts: Arc<AtomicUsize>,
) {
    seed_once(&chain, &settings, &connect_tx, &dns_attempts).await;
    loop {
        need_connections.notified().await;
        if registry.active_outbound_count() >= settings.min_outgoing_connections {
            continue;
        }
        seed_once(&chain, &settings, &connect_tx, &dns_attempts).await;
    }
}

async fn seed_once(
    chain: &ChainParams,
    settings: &NodeSettings,
    connect_tx: &mpsc::Sender<ConnectRequest>,
    dns_attempts: &AtomicUsize,
) {
    if chain.dns_seeds.is_empty() && !settings.force_dns_seeding {
        return;
    }
    dns_attempts.fetch_add(1, Ordering::Relaxed);
    let endpoints = dns::resolve_all_seeds(&chain.dns_seeds, chain.default_port).await;
    for endpoint in endpoints {
        let request = ConnectRequest {
            addr: std::net::SocketAddr::new(endpoint.address.to_ip(), endpoint.port),
            connection_type: ConnectionType::Seed,
        };
        let _ = connect_tx.send(request).await;
    }
}
