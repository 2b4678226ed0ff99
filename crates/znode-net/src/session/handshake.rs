use bitflags::bitflags;

use crate::error::SessionError;
use crate::message::MessageTag;

/// Which side initiated the TCP connection. `Manual` and `Seed` are both
/// outbound but carry different hub-level retry policy (see `hub::connector`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    Inbound,
    Outbound,
    Manual,
    Seed,
}

impl ConnectionType {
    pub fn is_inbound(self) -> bool {
        matches!(self, ConnectionType::Inbound)
    }
}

bitflags! {
    /// The four handshake flags that, all set, compose into `Completed`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HandshakeStatus: u8 {
        const VERSION_SENT = 0b0001;
        const VERSION_ACK_RECEIVED = 0b0010;
        const VERSION_RECEIVED = 0b0100;
        const VERSION_ACK_SENT = 0b1000;
    }
}

impl HandshakeStatus {
    pub fn is_completed(self) -> bool {
        self.contains(HandshakeStatus::all())
    }
}

impl Default for HandshakeStatus {
    fn default() -> Self {
        HandshakeStatus::empty()
    }
}

/// What a legal handshake transition asks the session to do, beyond
/// flipping the status bit: these drive `on_handshake_completed` and the
/// "send our Version if we haven't yet" rule on inbound Version receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeAction {
    None,
    ScheduleVerAck,
    ScheduleVerAckAndMaybeVersion,
    FireCompleted,
}

/// Applies one incoming or outgoing handshake-relevant tag to the current
/// status. Returns the new status and what the session should do next, or
/// a `SessionError` if the transition is illegal.
pub fn apply_transition(
    status: HandshakeStatus,
    direction: Direction,
    tag: MessageTag,
) -> Result<(HandshakeStatus, HandshakeAction), SessionError> {
    if status.is_completed() {
        if matches!(tag, MessageTag::Version | MessageTag::VerAck) {
            return Err(SessionError::DuplicateProtocolHandShake);
        }
        return Ok((status, HandshakeAction::None));
    }

    match (direction, tag) {
        (Direction::Outbound, MessageTag::Version) => {
            let next = status | HandshakeStatus::VERSION_SENT;
            Ok((next, completion_action(next)))
        }
        (Direction::Inbound, MessageTag::Version) => {
            let next = status | HandshakeStatus::VERSION_RECEIVED;
            let action = if next.contains(HandshakeStatus::VERSION_SENT) {
                HandshakeAction::ScheduleVerAck
            } else {
                HandshakeAction::ScheduleVerAckAndMaybeVersion
            };
            Ok((next, action))
        }
        (Direction::Outbound, MessageTag::VerAck) => {
            if !status.contains(HandshakeStatus::VERSION_RECEIVED) {
                return Err(SessionError::InvalidProtocolHandShake);
            }
            let next = status | HandshakeStatus::VERSION_ACK_SENT;
            Ok((next, completion_action(next)))
        }
        (Direction::Inbound, MessageTag::VerAck) => {
            if !status.contains(HandshakeStatus::VERSION_SENT) {
                return Err(SessionError::InvalidProtocolHandShake);
            }
            let next = status | HandshakeStatus::VERSION_ACK_RECEIVED;
            Ok((next, completion_action(next)))
        }
        (_, other) if !other.is_handshake_tag() => {
            if status.contains(HandshakeStatus::VERSION_RECEIVED)
                && status.contains(HandshakeStatus::VERSION_SENT)
            {
                Ok((status, HandshakeAction::None))
            } else {
                Err(SessionError::InvalidProtocolHandShake)
            }
        }
        _ => Err(SessionError::InvalidProtocolHandShake),
    }
}

fn completion_action(status: HandshakeStatus) -> HandshakeAction {
    if status.is_completed() {
        HandshakeAction::FireCompleted
    } else {
        HandshakeAction::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}
