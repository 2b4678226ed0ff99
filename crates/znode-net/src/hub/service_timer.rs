//! Service timer: the hub's only per-tick maintenance sweep. Reaps sessions
//! that have stopped running, classifies idleness on everything still
//! running and asks the non-`NotIdle` ones to stop, and — while the hub
//! itself is shutting down — caps how many sessions get asked to stop in a
//! single tick so a large swarm doesn't cancel all its I/O in one poll.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::trace;

use crate::constants::{MAX_STOPPING_SESSIONS_PER_TICK, SERVICE_TIMER_INTERVAL_MILLIS};
use crate::error::IdleReason;

use super::sessions::SessionRegistry;

pub async fn run(
    registry: Arc<SessionRegistry>,
    active_connections_gauge: Arc<AtomicUsize>,
    stopping: Arc<AtomicBool>,
) {
    let mut ticker = tokio::time::interval(std::time::Duration::from_millis(
        SERVICE_TIMER_INTERVAL_MILLIS,
    ));
    loop {
        ticker.tick().await;
        tick(&registry, &active_connections_gauge, &stopping);
    }
}

fn tick(registry: &SessionRegistry, active_connections_gauge: &AtomicUsize, stopping: &AtomicBool) {
    let now = Instant::now();
    let sessions = registry.all();
    let mut stopped_this_tick = 0usize;
    let is_stopping = stopping.load(Ordering::Acquire);

    for session in &sessions {
        if !session.is_running() {
            registry.remove(session.id());
            continue;
        }

        if is_stopping {
            if stopped_this_tick >= MAX_STOPPING_SESSIONS_PER_TICK {
                continue;
            }
            session.request_stop();
            stopped_this_tick += 1;
            continue;
        }

        match session.classify_idleness(now) {
            IdleReason::NotIdle => {}
            reason => {
                trace!(session = session.id(), ?reason, "session idle, stopping");
                session.request_stop();
            }
        }
    }

    active_connections_gauge.store(registry.len(), Ordering::Relaxed);
}
