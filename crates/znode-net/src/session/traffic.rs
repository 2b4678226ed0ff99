use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Cumulative and one-second-sliding byte counters for a session's traffic,
/// sampled by the hub's info timer. Updated without any registry-level
/// lock — each session's atomics stand on their own.
#[derive(Debug)]
pub struct TrafficMeter {
    cumulative_sent: AtomicU64,
    cumulative_received: AtomicU64,
    window_sent: AtomicU64,
    window_received: AtomicU64,
    window_started_at: std::sync::Mutex<Instant>,
}

impl Default for TrafficMeter {
    fn default() -> Self {
        Self {
            cumulative_sent: AtomicU64::new(0),
            cumulative_received: AtomicU64::new(0),
            window_sent: AtomicU64::new(0),
            window_received: AtomicU64::new(0),
            window_started_at: std::sync::Mutex::new(Instant::now()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficSnapshot {
    pub cumulative_sent: u64,
    pub cumulative_received: u64,
    pub last_second_sent: u64,
    pub last_second_received: u64,
}

impl TrafficMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sent(&self, n: u64) {
        self.cumulative_sent.fetch_add(n, Ordering::Relaxed);
        self.window_sent.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_received(&self, n: u64) {
        self.cumulative_received.fetch_add(n, Ordering::Relaxed);
        self.window_received.fetch_add(n, Ordering::Relaxed);
    }

    /// Rolls the one-second window over if it has elapsed, returning the
    /// current cumulative and sliding-window totals either way.
    pub fn sample(&self) -> TrafficSnapshot {
        let mut started_at = self.window_started_at.lock().unwrap();
        let (last_second_sent, last_second_received) = if started_at.elapsed().as_secs() >= 1 {
            let sent = self.window_sent.swap(0, Ordering::Relaxed);
            let received = self.window_received.swap(0, Ordering::Relaxed);
            *started_at = Instant::now();
            (sent, received)
        } else {
            (
                self.window_sent.load(Ordering::Relaxed),
                self.window_received.load(Ordering::Relaxed),
            )
        };
        TrafficSnapshot {
            cumulative_sent: self.cumulative_sent.load(Ordering::Relaxed),
            cumulative_received: self.cumulative_received.load(Ordering::Relaxed),
            last_second_sent,
            last_second_received,
        }
    }
}
