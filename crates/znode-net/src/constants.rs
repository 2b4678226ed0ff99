//! Networking-layer constants. Framing- and codec-level ceilings are
//! defined once in `znode_codec::constants` and re-exported here so the
//! message and session modules have a single `crate::constants` to import
//! from; the rest are specific to this crate.

pub use znode_codec::constants::{
    ADDR_ITEM_SIZE, COMMAND_FIELD_LENGTH, INV_ITEM_SIZE, MAX_ADDR_ITEMS,
    MAX_BYTES_PER_IO, MAX_COMPACT_SIZE, MAX_GETHEADERS_LOCATOR_ITEMS, MAX_INV_ITEMS,
    MAX_MESSAGES_PER_READ, MAX_PROTOCOL_MESSAGE_LENGTH, MAX_REJECT_REASON_LENGTH,
    MESSAGE_HEADER_LENGTH,
};

/// Cadence of the hub's maintenance sweep: reap dead sessions, classify
/// idleness, re-feed the connector.
pub const SERVICE_TIMER_INTERVAL_MILLIS: u64 = 250;

/// Cadence of the hub's human-readable traffic summary.
pub const INFO_TIMER_INTERVAL_SECONDS: u64 = 60;

/// How many sessions the service timer asks to stop per tick while the hub
/// itself is shutting down, so a large swarm doesn't all cancel their I/O
/// in the same poll.
pub const MAX_STOPPING_SESSIONS_PER_TICK: usize = 16;

/// Poll interval while `ConnectionHub::stop` waits for the session count to
/// reach zero.
pub const STOP_POLL_INTERVAL_SECONDS: u64 = 2;

/// Outbound SYN retry count (`TCP_SYNCNT` on Linux) set on each dial-out
/// socket before connecting, shortened from the OS default so a single
/// unreachable candidate doesn't stall the connector loop behind a long
/// retransmit schedule.
pub const CONNECT_RETRY_COUNT: u32 = 2;

/// Send and receive buffer size set on the acceptor's listening socket.
pub const SOCKET_BUFFER_SIZE: usize = 64 * 1024;

/// How often the hub re-checks that every manually configured node still
/// has a live session, redialing any that don't.
pub const MANUAL_RECONNECT_INTERVAL_SECONDS: u64 = 30;
