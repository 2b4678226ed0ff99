use std::time::{Duration, Instant};

use rand::Rng;

use crate::error::SessionError;

/// Weight given to a fresh sample when folding it into the running
/// exponentially weighted round-trip average.
const EMA_ALPHA: f64 = 0.125;

/// Tracks one outstanding ping at a time and an exponentially weighted
/// moving average of round-trip latency across samples.
#[derive(Debug, Default)]
pub struct PingMeter {
    pending_nonce: Option<u64>,
    sample_started_at: Option<Instant>,
    ema_rtt: Option<Duration>,
}

impl PingMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a nonzero nonce and marks a sample as outstanding. Returns
    /// `None` if a sample is already in flight (the scheduler should not
    /// fire again until the current one resolves or times out).
    pub fn start_sample(&mut self) -> Option<u64> {
        if self.pending_nonce.is_some() {
            return None;
        }
        let nonce = loop {
            let candidate: u64 = rand::thread_rng().gen();
            if candidate != 0 {
                break candidate;
            }
        };
        self.pending_nonce = Some(nonce);
        self.sample_started_at = Some(Instant::now());
        Some(nonce)
    }

    /// Resolves an incoming Pong against the outstanding sample, folding its
    /// latency into the EMA on success.
    pub fn end_sample(&mut self, received_nonce: u64) -> Result<Duration, SessionError> {
        let expected = self.pending_nonce.ok_or(SessionError::UnsolicitedPong)?;
        if expected != received_nonce {
            return Err(SessionError::InvalidPingPongNonce);
        }
        let started = self
            .sample_started_at
            .take()
            .expect("sample_started_at is set whenever pending_nonce is");
        self.pending_nonce = None;
        let elapsed = started.elapsed();
        self.ema_rtt = Some(match self.ema_rtt {
            None => elapsed,
            Some(previous) => {
                let previous_ms = previous.as_secs_f64() * 1000.0;
                let sample_ms = elapsed.as_secs_f64() * 1000.0;
                let blended_ms = previous_ms + EMA_ALPHA * (sample_ms - previous_ms);
                Duration::from_secs_f64((blended_ms / 1000.0).max(0.0))
            }
        });
        Ok(elapsed)
    }

    pub fn pending_sample_duration(&self) -> Option<Duration> {
        self.sample_started_at.map(|start| start.elapsed())
    }

    pub fn ema_round_trip(&self) -> Option<Duration> {
        self.ema_rtt
    }
}

/// Next fire delay for the ping scheduler: `interval` randomized uniformly
/// within ±30%, so peers don't all ping in lockstep.
pub fn next_ping_interval(base: Duration) -> Duration {
    let jitter_fraction = rand::thread_rng().gen_range(-0.30..=0.30);
    let millis = (base.as_secs_f64() * (1.0 + jitter_fraction) * 1000.0).max(0.0);
    Duration::from_millis(millis as u64)
}
