//! Protocol-wide ceilings shared by the codec and the message layer built on
//! top of it. These are deliberately generous upper bounds, not tuned
//! defaults — actual traffic is far smaller.

/// Largest value a compact-size integer may decode to, regardless of how
/// many bytes were used to encode it.
pub const MAX_COMPACT_SIZE: u64 = 0x0200_0000;

/// Ceiling on a single wire message's total length (header + payload).
pub const MAX_PROTOCOL_MESSAGE_LENGTH: usize = 32 * 1024 * 1024;

/// Reject payload's reason string, in bytes.
pub const MAX_REJECT_REASON_LENGTH: usize = 256;

pub const MAX_INV_ITEMS: usize = 50_000;
pub const INV_ITEM_SIZE: usize = 36;

pub const MAX_ADDR_ITEMS: usize = 1_000;
pub const ADDR_ITEM_SIZE: usize = 30;

pub const MAX_GETHEADERS_LOCATOR_ITEMS: usize = 2_000;

/// Bytes of socket data a single read is allowed to hand to the parser
/// before yielding back to the scheduler.
pub const MAX_BYTES_PER_IO: usize = 64 * 1024;

/// Flood guard: how many complete messages a single socket read may yield
/// before the remainder is deferred to the next poll.
pub const MAX_MESSAGES_PER_READ: usize = 32;

/// Length of a `MessageHeader` on the wire.
pub const MESSAGE_HEADER_LENGTH: usize = 24;

/// Length in bytes of the command field inside a `MessageHeader`.
pub const COMMAND_FIELD_LENGTH: usize = 12;
