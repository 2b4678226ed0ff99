//! The hub's registry of live sessions: the single source of truth for
//! `|sessions|`, the per-IP connection multiset, and the hub's monotonic
//! lifetime counters. One mutex guards structural updates (insert/remove);
//! per-session state itself lives on the session's own atomics and is never
//! touched here.

use std::collections::{BTreeMap, HashMap};
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::session::{ConnectionType, PeerSession, SessionSnapshot};

#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<BTreeMap<u64, Arc<PeerSession>>>,
    per_ip: Mutex<HashMap<IpAddr, usize>>,
    total_accepted: AtomicU64,
    total_disconnected: AtomicU64,
    total_rejected: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn per_ip_count(&self, ip: IpAddr) -> usize {
        self.per_ip.lock().unwrap().get(&ip).copied().unwrap_or(0)
    }

    pub fn has_running_session_for_ip(&self, ip: IpAddr) -> bool {
        self.sessions
            .lock()
            .unwrap()
            .values()
            .any(|s| s.is_running() && s.remote_endpoint().address.to_ip() == ip)
    }

    /// Registers a newly started session and bumps its per-IP count. The
    /// caller is responsible for having already checked the global and
    /// per-IP caps — this never rejects.
    pub fn insert(&self, session: Arc<PeerSession>) {
        let ip = session.remote_endpoint().address.to_ip();
        *self.per_ip.lock().unwrap().entry(ip).or_insert(0) += 1;
        self.sessions.lock().unwrap().insert(session.id(), session);
        self.total_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Removes a session by id, decrementing its per-IP count and erasing
    /// the IP entirely once it reaches zero so the map doesn't accumulate
    /// stale zero-count keys for addresses nobody is connected from anymore.
    pub fn remove(&self, id: u64) -> Option<Arc<PeerSession>> {
        let removed = self.sessions.lock().unwrap().remove(&id);
        if let Some(session) = &removed {
            let ip = session.remote_endpoint().address.to_ip();
            let mut per_ip = self.per_ip.lock().unwrap();
            if let Some(count) = per_ip.get_mut(&ip) {
                *count -= 1;
                if *count == 0 {
                    per_ip.remove(&ip);
                }
            }
            self.total_disconnected.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    pub fn mark_rejected(&self) {
        self.total_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_accepted(&self) -> u64 {
        self.total_accepted.load(Ordering::Relaxed)
    }

    pub fn total_disconnected(&self) -> u64 {
        self.total_disconnected.load(Ordering::Relaxed)
    }

    pub fn total_rejected(&self) -> u64 {
        self.total_rejected.load(Ordering::Relaxed)
    }

    /// All sessions, for the service timer's sweep. Returns owned `Arc`
    /// clones so the sweep never holds the registry lock across an await.
    pub fn all(&self) -> Vec<Arc<PeerSession>> {
        self.sessions.lock().unwrap().values().cloned().collect()
    }

    pub fn snapshots(&self) -> Vec<SessionSnapshot> {
        self.sessions
            .lock()
            .unwrap()
            .values()
            .map(|s| s.snapshot())
            .collect()
    }

    /// Count of running, non-inbound sessions — what the need-connections
    /// signal compares against `min_outgoing_connections`.
    pub fn active_outbound_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.is_running() && !matches!(s.connection_type(), ConnectionType::Inbound))
            .count()
    }
}
