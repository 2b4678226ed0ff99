use std::net::Ipv4Addr;
use std::sync::Arc;

use znode_net::address::{Address, Endpoint};
use znode_net::config::{ChainParams, NodeSettings};
use znode_net::hub::SessionRegistry;
use znode_net::session::{ConnectionType, PeerSession, SessionConfig};

fn make_session(connection_type: ConnectionType, remote_ip: Ipv4Addr, port: u16) -> Arc<PeerSession> {
    let chain = ChainParams::testnet();
    let settings = NodeSettings::default();
    let local = Endpoint::new(Address::V4(Ipv4Addr::new(127, 0, 0, 1)), 18233);
    let config = Arc::new(SessionConfig::new(&chain, &settings, local));
    let remote = Endpoint::new(Address::V4(remote_ip), port);
    PeerSession::new(connection_type, local, remote, config)
}

#[test]
fn inserting_a_session_makes_it_visible_and_counted_by_ip() {
    let registry = SessionRegistry::new();
    let session = make_session(ConnectionType::Inbound, Ipv4Addr::new(198, 51, 100, 1), 4000);
    let ip = session.remote_endpoint().address.to_ip();

    registry.insert(session);

    assert_eq!(registry.len(), 1);
    assert!(!registry.is_empty());
    assert_eq!(registry.per_ip_count(ip), 1);
    assert!(registry.has_running_session_for_ip(ip));
    assert_eq!(registry.total_accepted(), 1);
}

#[test]
fn two_sessions_from_the_same_ip_both_count_toward_its_per_ip_total() {
    let registry = SessionRegistry::new();
    let ip = Ipv4Addr::new(198, 51, 100, 7);
    let a = make_session(ConnectionType::Inbound, ip, 4001);
    let b = make_session(ConnectionType::Inbound, ip, 4002);

    registry.insert(a);
    registry.insert(b);

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.per_ip_count(ip.into()), 2);
}

#[test]
fn removing_a_session_drops_its_per_ip_entry_once_the_count_reaches_zero() {
    let registry = SessionRegistry::new();
    let session = make_session(ConnectionType::Outbound, Ipv4Addr::new(203, 0, 113, 9), 8233);
    let id = session.id();
    let ip = session.remote_endpoint().address.to_ip();

    registry.insert(session);
    let removed = registry.remove(id);

    assert!(removed.is_some());
    assert!(registry.is_empty());
    assert_eq!(registry.per_ip_count(ip), 0);
    assert_eq!(registry.total_disconnected(), 1);
}

#[test]
fn removing_an_unknown_id_is_a_no_op() {
    let registry = SessionRegistry::new();
    assert!(registry.remove(999).is_none());
    assert_eq!(registry.total_disconnected(), 0);
}

#[test]
fn active_outbound_count_ignores_inbound_sessions() {
    let registry = SessionRegistry::new();
    let inbound = make_session(ConnectionType::Inbound, Ipv4Addr::new(10, 0, 0, 1), 1);
    let outbound = make_session(ConnectionType::Outbound, Ipv4Addr::new(10, 0, 0, 2), 2);
    let manual = make_session(ConnectionType::Manual, Ipv4Addr::new(10, 0, 0, 3), 3);

    registry.insert(inbound);
    registry.insert(outbound);
    registry.insert(manual);

    assert_eq!(registry.active_outbound_count(), 2);
}

#[test]
fn mark_rejected_increments_the_rejected_counter_without_touching_sessions() {
    let registry = SessionRegistry::new();
    registry.mark_rejected();
    registry.mark_rejected();
    assert_eq!(registry.total_rejected(), 2);
    assert!(registry.is_empty());
}
