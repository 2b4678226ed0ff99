/// Closed set of message tags this node understands. `MissingOrUnknown` is a
/// sentinel never produced by a successful header parse; it exists so
/// dispatch code has a total match arm for "we don't have a typed payload
/// for this command."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageTag {
    Version,
    VerAck,
    Ping,
    Pong,
    Addr,
    GetAddr,
    Inv,
    GetData,
    NotFound,
    GetHeaders,
    Headers,
    MemPool,
    Reject,
    MissingOrUnknown,
}

impl MessageTag {
    pub fn is_handshake_tag(self) -> bool {
        matches!(self, MessageTag::Version | MessageTag::VerAck)
    }
}

/// A tag's entry in the closed message registry: its wire command string,
/// payload size bounds, and (if vectorized) the item accounting needed to
/// validate a declared count against the bytes actually present.
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    pub tag: MessageTag,
    pub command: &'static str,
    pub min_payload: usize,
    pub max_payload: usize,
    pub vectorized: bool,
    pub max_items: usize,
    /// 0 means "items are not fixed-size" (no length-mismatch/duplicate check).
    pub item_size: usize,
    pub min_protocol_version: Option<u32>,
    pub max_protocol_version: Option<u32>,
}

use crate::constants::{
    ADDR_ITEM_SIZE, INV_ITEM_SIZE, MAX_ADDR_ITEMS, MAX_GETHEADERS_LOCATOR_ITEMS, MAX_INV_ITEMS,
};

const MAX_USER_AGENT_PAYLOAD: usize = 1024;
const MAX_REJECT_PAYLOAD: usize = 1 + 256 + 1 + 256 + 32;

pub static REGISTRY: &[RegistryEntry] = &[
    RegistryEntry {
        tag: MessageTag::Version,
        command: "version",
        min_payload: 4 + 8 + 8 + 18 + 18 + 8 + 1 + 4 + 1,
        max_payload: 4 + 8 + 8 + 18 + 18 + 8 + 1 + MAX_USER_AGENT_PAYLOAD + 4 + 1,
        vectorized: false,
        max_items: 0,
        item_size: 0,
        min_protocol_version: None,
        max_protocol_version: None,
    },
    RegistryEntry {
        tag: MessageTag::VerAck,
        command: "verack",
        min_payload: 0,
        max_payload: 0,
        vectorized: false,
        max_items: 0,
        item_size: 0,
        min_protocol_version: None,
        max_protocol_version: None,
    },
    RegistryEntry {
        tag: MessageTag::Ping,
        command: "ping",
        min_payload: 8,
        max_payload: 8,
        vectorized: false,
        max_items: 0,
        item_size: 0,
        min_protocol_version: None,
        max_protocol_version: None,
    },
    RegistryEntry {
        tag: MessageTag::Pong,
        command: "pong",
        min_payload: 8,
        max_payload: 8,
        vectorized: false,
        max_items: 0,
        item_size: 0,
        min_protocol_version: None,
        max_protocol_version: None,
    },
    RegistryEntry {
        tag: MessageTag::Addr,
        command: "addr",
        min_payload: 1,
        max_payload: 3 + MAX_ADDR_ITEMS * ADDR_ITEM_SIZE,
        vectorized: true,
        max_items: MAX_ADDR_ITEMS,
        item_size: ADDR_ITEM_SIZE,
        min_protocol_version: None,
        max_protocol_version: None,
    },
    RegistryEntry {
        tag: MessageTag::GetAddr,
        command: "getaddr",
        min_payload: 0,
        max_payload: 0,
        vectorized: false,
        max_items: 0,
        item_size: 0,
        min_protocol_version: None,
        max_protocol_version: None,
    },
    RegistryEntry {
        tag: MessageTag::Inv,
        command: "inv",
        min_payload: 1,
        max_payload: 3 + MAX_INV_ITEMS * INV_ITEM_SIZE,
        vectorized: true,
        max_items: MAX_INV_ITEMS,
        item_size: INV_ITEM_SIZE,
        min_protocol_version: None,
        max_protocol_version: None,
    },
    RegistryEntry {
        tag: MessageTag::GetData,
        command: "getdata",
        min_payload: 1,
        max_payload: 3 + MAX_INV_ITEMS * INV_ITEM_SIZE,
        vectorized: true,
        max_items: MAX_INV_ITEMS,
        item_size: INV_ITEM_SIZE,
        min_protocol_version: None,
        max_protocol_version: None,
    },
    RegistryEntry {
        tag: MessageTag::NotFound,
        command: "notfound",
        min_payload: 1,
        max_payload: 3 + MAX_INV_ITEMS * INV_ITEM_SIZE,
        vectorized: true,
        max_items: MAX_INV_ITEMS,
        item_size: INV_ITEM_SIZE,
        min_protocol_version: None,
        max_protocol_version: None,
    },
    RegistryEntry {
        tag: MessageTag::GetHeaders,
        command: "getheaders",
        min_payload: 4 + 1 + 32 + 32,
        max_payload: 4 + 3 + MAX_GETHEADERS_LOCATOR_ITEMS * 32 + 32,
        vectorized: true,
        max_items: MAX_GETHEADERS_LOCATOR_ITEMS,
        item_size: 32,
        min_protocol_version: None,
        max_protocol_version: None,
    },
    RegistryEntry {
        tag: MessageTag::Headers,
        command: "headers",
        min_payload: 1,
        max_payload: crate::constants::MAX_PROTOCOL_MESSAGE_LENGTH,
        vectorized: false,
        max_items: 0,
        item_size: 0,
        min_protocol_version: None,
        max_protocol_version: None,
    },
    RegistryEntry {
        tag: MessageTag::MemPool,
        command: "mempool",
        min_payload: 0,
        max_payload: 0,
        vectorized: false,
        max_items: 0,
        item_size: 0,
        min_protocol_version: None,
        max_protocol_version: None,
    },
    RegistryEntry {
        tag: MessageTag::Reject,
        command: "reject",
        min_payload: 1 + 1 + 1,
        max_payload: MAX_REJECT_PAYLOAD,
        vectorized: false,
        max_items: 0,
        item_size: 0,
        min_protocol_version: None,
        max_protocol_version: None,
    },
];

pub fn lookup_by_command(command: &str) -> Option<&'static RegistryEntry> {
    REGISTRY.iter().find(|entry| entry.command == command)
}

pub fn lookup_by_tag(tag: MessageTag) -> Option<&'static RegistryEntry> {
    REGISTRY.iter().find(|entry| entry.tag == tag)
}
