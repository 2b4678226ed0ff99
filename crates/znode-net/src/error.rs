use thiserror::Error;

/// Everything that can stop a `Message` from being built or parsed. Recoverable
/// variants (`HeaderIncomplete`, `BodyIncomplete`) are reported back to the
/// feeder and simply ask for more bytes; every other variant is fatal to the
/// session that produced it.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FramingError {
    #[error("need more bytes to complete the header")]
    HeaderIncomplete,
    #[error("need more bytes to complete the payload")]
    BodyIncomplete,
    #[error("message magic does not match the configured network")]
    InvalidMagic,
    #[error("command string does not resolve to a known message tag")]
    UnknownCommand,
    #[error("command field is all NUL bytes")]
    EmptyCommand,
    #[error("command field is not NUL-padded printable ASCII")]
    MalformedCommand,
    #[error("payload is smaller than the tag's minimum size")]
    UndersizedPayload,
    #[error("payload is larger than the tag's maximum size")]
    OversizedPayload,
    #[error("payload checksum does not match the header")]
    InvalidChecksum,
    #[error("vectorized payload declares zero items")]
    EmptyVector,
    #[error("vectorized payload declares more items than the tag allows")]
    OversizedVector,
    #[error("vectorized payload's byte length does not match its declared item count")]
    LengthMismatchesVectorSize,
    #[error("vectorized payload contains duplicate items")]
    DuplicateVectorItems,
    #[error("message tag requires a higher protocol version than negotiated")]
    UnsupportedMessageTypeForProtocolVersion,
    #[error("message tag is no longer supported at the negotiated protocol version")]
    DeprecatedMessageTypeForProtocolVersion,
    #[error("push() called on a non-pristine message")]
    PushNotPermitted,
    #[error("decoded payload could not be dispatched to a handler")]
    PayloadUnhandleable,
    #[error("payload carried bytes beyond what its fields account for")]
    PayloadExtraData,
    #[error("more than the allowed number of messages were parsed from one read")]
    FloodingDetected,
    #[error(transparent)]
    Codec(#[from] znode_codec::Error),
}

/// Failures specific to a session's handshake and liveness bookkeeping.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum SessionError {
    #[error("message tag is not legal in the current handshake state")]
    InvalidProtocolHandShake,
    #[error("handshake already completed; a second version/verack is illegal")]
    DuplicateProtocolHandShake,
    #[error("peer's protocol version is outside the supported range")]
    InvalidProtocolVersion,
    #[error("peer's nonce matches our own; this is a loopback connection to ourselves")]
    ConnectedToSelf,
    #[error("received a pong with no outstanding ping sample")]
    UnsolicitedPong,
    #[error("received a pong whose nonce does not match the outstanding ping")]
    InvalidPingPongNonce,
    #[error("outstanding ping exceeded its timeout")]
    PingTimeout,
    #[error("partial inbound message exceeded the inbound timeout")]
    InboundTimeout,
    #[error("partial outbound message exceeded the outbound timeout")]
    OutboundTimeout,
    #[error("handshake did not complete within the configured timeout")]
    ProtocolHandshakeTimeout,
    #[error("session has been idle past the global timeout")]
    GlobalTimeout,
}

/// The reasons `PeerSession::classify_idleness` can return, `NotIdle` included
/// so the hub's service timer can match exhaustively without an `Option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleReason {
    NotIdle,
    PingTimeout,
    ProtocolHandshakeTimeout,
    InboundTimeout,
    OutboundTimeout,
    GlobalTimeout,
}

impl IdleReason {
    pub fn into_session_error(self) -> Option<SessionError> {
        match self {
            IdleReason::NotIdle => None,
            IdleReason::PingTimeout => Some(SessionError::PingTimeout),
            IdleReason::ProtocolHandshakeTimeout => Some(SessionError::ProtocolHandshakeTimeout),
            IdleReason::InboundTimeout => Some(SessionError::InboundTimeout),
            IdleReason::OutboundTimeout => Some(SessionError::OutboundTimeout),
            IdleReason::GlobalTimeout => Some(SessionError::GlobalTimeout),
        }
    }
}

/// Top-level error a session surfaces when it stops.
#[derive(Debug, Error, Clone)]
pub enum SessionStopError {
    #[error(transparent)]
    Framing(#[from] FramingError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("TLS error: {0}")]
    Tls(String),
}

/// Errors surfaced by the connection hub's own lifecycle (not per-session).
#[derive(Debug, Error)]
pub enum HubError {
    #[error("failed to bind the acceptor socket at {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to configure TLS: {0}")]
    Tls(String),
    #[error("failed to resolve DNS seed {hostname}: {source}")]
    DnsResolution {
        hostname: String,
        #[source]
        source: trust_dns_resolver::error::ResolveError,
    },
    #[error("node settings are invalid: {0}")]
    InvalidSettings(String),
}
