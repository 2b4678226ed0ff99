use znode_net::error::SessionError;
use znode_net::session::{PingMeter, TrafficMeter};

#[test]
fn a_sample_cannot_start_twice_while_one_is_outstanding() {
    let mut meter = PingMeter::new();
    assert!(meter.start_sample().is_some());
    assert!(meter.start_sample().is_none());
}

#[test]
fn resolving_a_pong_with_no_outstanding_sample_is_unsolicited() {
    let mut meter = PingMeter::new();
    let err = meter.end_sample(1234).unwrap_err();
    assert_eq!(err, SessionError::UnsolicitedPong);
}

#[test]
fn resolving_a_pong_with_the_wrong_nonce_is_rejected() {
    let mut meter = PingMeter::new();
    let nonce = meter.start_sample().unwrap();
    let err = meter.end_sample(nonce.wrapping_add(1)).unwrap_err();
    assert_eq!(err, SessionError::InvalidPingPongNonce);
}

#[test]
fn a_resolved_sample_seeds_the_round_trip_average_and_clears_the_pending_nonce() {
    let mut meter = PingMeter::new();
    assert!(meter.ema_round_trip().is_none());
    let nonce = meter.start_sample().unwrap();
    meter.end_sample(nonce).unwrap();
    assert!(meter.ema_round_trip().is_some());
    // the pending sample resolved, so a fresh one can start immediately
    assert!(meter.start_sample().is_some());
}

#[test]
fn traffic_meter_accumulates_sent_and_received_bytes_independently() {
    let meter = TrafficMeter::new();
    meter.add_sent(100);
    meter.add_sent(50);
    meter.add_received(20);

    let snapshot = meter.sample();
    assert_eq!(snapshot.cumulative_sent, 150);
    assert_eq!(snapshot.cumulative_received, 20);
    // the window hasn't rolled over yet, so it mirrors the cumulative totals
    assert_eq!(snapshot.last_second_sent, 150);
    assert_eq!(snapshot.last_second_received, 20);
}

#[test]
fn traffic_meter_cumulative_total_never_resets_across_samples() {
    let meter = TrafficMeter::new();
    meter.add_sent(10);
    let _ = meter.sample();
    meter.add_sent(5);
    let snapshot = meter.sample();
    assert_eq!(snapshot.cumulative_sent, 15);
}
