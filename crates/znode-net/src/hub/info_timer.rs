//! Info timer: periodically logs a human-readable summary of the swarm —
//! how many inbound/outbound sessions are up, and cumulative plus
//! instantaneous traffic — at a configurable cadence. Never touches
//! anything but read-only snapshots.

use std::sync::Arc;

use tracing::info;

use crate::session::{ConnectionType, TrafficMeter};

use super::sessions::SessionRegistry;

pub async fn run(registry: Arc<SessionRegistry>, traffic: Arc<TrafficMeter>, interval_secs: u64) {
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
    loop {
        ticker.tick().await;
        tick(&registry, &traffic);
    }
}

fn tick(registry: &SessionRegistry, traffic: &TrafficMeter) {
    let snapshots = registry.snapshots();
    let inbound = snapshots
        .iter()
        .filter(|s| matches!(s.connection_type, ConnectionType::Inbound))
        .count();
    let outbound = snapshots.len() - inbound;
    let sample = traffic.sample();

    info!(
        inbound,
        outbound,
        cumulative_sent = sample.cumulative_sent,
        cumulative_received = sample.cumulative_received,
        bytes_per_sec_sent = sample.last_second_sent,
        bytes_per_sec_received = sample.last_second_received,
        total_accepted = registry.total_accepted(),
        total_disconnected = registry.total_disconnected(),
        total_rejected = registry.total_rejected(),
        "swarm status"
    );
}
