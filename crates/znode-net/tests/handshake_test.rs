use znode_net::message::MessageTag;
use znode_net::session::{apply_transition, Direction, HandshakeAction, HandshakeStatus};

#[test]
fn outbound_initiator_completes_after_verack_exchange() {
    let status = HandshakeStatus::empty();

    let (status, action) =
        apply_transition(status, Direction::Outbound, MessageTag::Version).unwrap();
    assert_eq!(action, HandshakeAction::None);

    let (status, action) =
        apply_transition(status, Direction::Inbound, MessageTag::Version).unwrap();
    assert_eq!(action, HandshakeAction::ScheduleVerAck);

    let (status, action) =
        apply_transition(status, Direction::Outbound, MessageTag::VerAck).unwrap();
    assert_eq!(action, HandshakeAction::None);

    let (status, action) =
        apply_transition(status, Direction::Inbound, MessageTag::VerAck).unwrap();
    assert_eq!(action, HandshakeAction::FireCompleted);
    assert!(status.is_completed());
}

#[test]
fn inbound_responder_is_told_to_send_its_own_version_first() {
    let status = HandshakeStatus::empty();
    let (status, action) =
        apply_transition(status, Direction::Inbound, MessageTag::Version).unwrap();
    assert_eq!(action, HandshakeAction::ScheduleVerAckAndMaybeVersion);
    assert!(status.contains(HandshakeStatus::VERSION_RECEIVED));
}

#[test]
fn verack_before_version_is_rejected() {
    let status = HandshakeStatus::empty();
    let err = apply_transition(status, Direction::Outbound, MessageTag::VerAck).unwrap_err();
    assert_eq!(err, znode_net::error::SessionError::InvalidProtocolHandShake);
}

#[test]
fn a_second_version_after_completion_is_a_duplicate_handshake_error() {
    let status = HandshakeStatus::all();
    assert!(status.is_completed());
    let err = apply_transition(status, Direction::Inbound, MessageTag::Version).unwrap_err();
    assert_eq!(
        err,
        znode_net::error::SessionError::DuplicateProtocolHandShake
    );
}

#[test]
fn non_handshake_messages_are_illegal_before_the_handshake_completes() {
    let status = HandshakeStatus::empty();
    let err = apply_transition(status, Direction::Inbound, MessageTag::Ping).unwrap_err();
    assert_eq!(err, znode_net::error::SessionError::InvalidProtocolHandShake);
}

#[test]
fn non_handshake_messages_are_legal_once_both_versions_are_exchanged() {
    let status = HandshakeStatus::VERSION_SENT | HandshakeStatus::VERSION_RECEIVED;
    let (next, action) = apply_transition(status, Direction::Inbound, MessageTag::Ping).unwrap();
    assert_eq!(next, status);
    assert_eq!(action, HandshakeAction::None);
}
