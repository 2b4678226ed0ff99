mod header;
mod parser;
mod payloads;
mod registry;

pub use header::{double_sha256_checksum, MessageHeader, EMPTY_PAYLOAD_CHECKSUM};
pub use parser::{IncrementalParser, InboundFrame, OutboundFrame};
pub use payloads::{
    AddrEntry, AddrPayload, GetAddrPayload, GetHeadersPayload, HeadersPayload, InventoryItem,
    InventoryPayload, MemPoolPayload, Payload, PingPayload, PongPayload, RejectPayload,
    VerAckPayload, VersionPayload,
};
pub use registry::{lookup_by_command, lookup_by_tag, MessageTag, RegistryEntry, REGISTRY};
