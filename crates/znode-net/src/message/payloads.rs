use znode_codec::{ByteStream, Decode, Encode, Error as CodecError, NetCodec, Result as CodecResult, WireSize};

use crate::address::Endpoint;
use crate::constants::MAX_REJECT_REASON_LENGTH;

#[derive(Debug, Clone, PartialEq, Eq, NetCodec)]
pub struct VersionPayload {
    pub protocol_version: i32,
    pub services: u64,
    pub timestamp: i64,
    pub recipient: Endpoint,
    pub sender: Endpoint,
    pub nonce: u64,
    pub user_agent: String,
    pub start_height: i32,
    pub relay: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, NetCodec)]
pub struct VerAckPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, NetCodec)]
pub struct PingPayload(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, NetCodec)]
pub struct PongPayload(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, NetCodec)]
pub struct GetAddrPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq, NetCodec)]
pub struct MemPoolPayload;

/// One entry of an `addr` message: a service timestamp plus the endpoint it
/// was last seen at. The endpoint's field order (address, then port) is
/// what makes this struct's wire layout line up with `ADDR_ITEM_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, NetCodec)]
pub struct AddrEntry {
    pub time: u32,
    pub services: u64,
    pub endpoint: Endpoint,
}

#[derive(Debug, Clone, PartialEq, Eq, NetCodec)]
pub struct AddrPayload(pub Vec<AddrEntry>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, NetCodec)]
pub struct InventoryItem {
    pub kind: u32,
    pub hash: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq, NetCodec)]
pub struct InventoryPayload(pub Vec<InventoryItem>);

#[derive(Debug, Clone, PartialEq, Eq, NetCodec)]
pub struct GetHeadersPayload {
    pub protocol_version: i32,
    pub locator_hashes: Vec<[u8; 32]>,
    pub stop_hash: [u8; 32],
}

/// Opaque — headers themselves are consensus data and out of scope here;
/// the hub forwards the raw bytes to the chain subsystem unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadersPayload(pub Vec<u8>);

impl WireSize for HeadersPayload {
    const FIXED_SIZE: Option<usize> = None;

    fn encoded_len(&self) -> usize {
        self.0.len()
    }
}

impl Encode for HeadersPayload {
    fn encode(&self, out: &mut ByteStream) -> CodecResult<()> {
        out.append(&self.0);
        Ok(())
    }
}

impl Decode for HeadersPayload {
    fn decode(input: &mut ByteStream) -> CodecResult<Self> {
        Ok(HeadersPayload(input.read_to_end().to_vec()))
    }
}

/// `reject`'s trailing 32-byte hash is present or absent depending on how
/// many bytes the sender included; we accept both and never reject a
/// message solely for guessing wrong about the sender's intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectPayload {
    pub rejected_command: String,
    pub code: u8,
    pub reason: String,
    pub extra_data: Option<[u8; 32]>,
}

impl WireSize for RejectPayload {
    const FIXED_SIZE: Option<usize> = None;

    fn encoded_len(&self) -> usize {
        self.rejected_command.encoded_len()
            + 1
            + self.reason.encoded_len()
            + self.extra_data.map_or(0, |_| 32)
    }
}

impl Encode for RejectPayload {
    fn encode(&self, out: &mut ByteStream) -> CodecResult<()> {
        self.rejected_command.encode(out)?;
        self.code.encode(out)?;
        self.reason.encode(out)?;
        if let Some(extra) = self.extra_data {
            out.append(&extra);
        }
        Ok(())
    }
}

impl Decode for RejectPayload {
    fn decode(input: &mut ByteStream) -> CodecResult<Self> {
        let rejected_command = String::decode(input)?;
        let code = u8::decode(input)?;
        let reason = String::decode(input)?;
        if reason.len() > MAX_REJECT_REASON_LENGTH {
            return Err(CodecError::StringTooBig(reason.len()));
        }
        let extra_data = if input.avail() >= 32 {
            Some(<[u8; 32]>::decode(input)?)
        } else {
            None
        };
        Ok(RejectPayload {
            rejected_command,
            code,
            reason,
            extra_data,
        })
    }
}

/// A decoded payload tagged with which registry entry produced it, for
/// uniform dispatch by the session and the hub's routing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Version(VersionPayload),
    VerAck(VerAckPayload),
    Ping(PingPayload),
    Pong(PongPayload),
    Addr(AddrPayload),
    GetAddr(GetAddrPayload),
    Inv(InventoryPayload),
    GetData(InventoryPayload),
    NotFound(InventoryPayload),
    GetHeaders(GetHeadersPayload),
    Headers(HeadersPayload),
    MemPool(MemPoolPayload),
    Reject(RejectPayload),
}

impl Payload {
    pub fn tag(&self) -> super::registry::MessageTag {
        use super::registry::MessageTag as Tag;
        match self {
            Payload::Version(_) => Tag::Version,
            Payload::VerAck(_) => Tag::VerAck,
            Payload::Ping(_) => Tag::Ping,
            Payload::Pong(_) => Tag::Pong,
            Payload::Addr(_) => Tag::Addr,
            Payload::GetAddr(_) => Tag::GetAddr,
            Payload::Inv(_) => Tag::Inv,
            Payload::GetData(_) => Tag::GetData,
            Payload::NotFound(_) => Tag::NotFound,
            Payload::GetHeaders(_) => Tag::GetHeaders,
            Payload::Headers(_) => Tag::Headers,
            Payload::MemPool(_) => Tag::MemPool,
            Payload::Reject(_) => Tag::Reject,
        }
    }

    pub fn decode(tag: super::registry::MessageTag, bytes: &[u8]) -> CodecResult<Self> {
        use super::registry::MessageTag as Tag;
        let mut stream = ByteStream::from_vec(bytes.to_vec());
        Ok(match tag {
            Tag::Version => Payload::Version(VersionPayload::decode(&mut stream)?),
            Tag::VerAck => Payload::VerAck(VerAckPayload::decode(&mut stream)?),
            Tag::Ping => Payload::Ping(PingPayload::decode(&mut stream)?),
            Tag::Pong => Payload::Pong(PongPayload::decode(&mut stream)?),
            Tag::Addr => Payload::Addr(AddrPayload::decode(&mut stream)?),
            Tag::GetAddr => Payload::GetAddr(GetAddrPayload::decode(&mut stream)?),
            Tag::Inv => Payload::Inv(InventoryPayload::decode(&mut stream)?),
            Tag::GetData => Payload::GetData(InventoryPayload::decode(&mut stream)?),
            Tag::NotFound => Payload::NotFound(InventoryPayload::decode(&mut stream)?),
            Tag::GetHeaders => Payload::GetHeaders(GetHeadersPayload::decode(&mut stream)?),
            Tag::Headers => Payload::Headers(HeadersPayload::decode(&mut stream)?),
            Tag::MemPool => Payload::MemPool(MemPoolPayload::decode(&mut stream)?),
            Tag::Reject => Payload::Reject(RejectPayload::decode(&mut stream)?),
            Tag::MissingOrUnknown => {
                return Err(CodecError::InvalidEnumValue(0));
            }
        })
    }

    pub fn encode_body(&self) -> CodecResult<Vec<u8>> {
        let mut stream = ByteStream::new();
        match self {
            Payload::Version(p) => p.encode(&mut stream)?,
            Payload::VerAck(p) => p.encode(&mut stream)?,
            Payload::Ping(p) => p.encode(&mut stream)?,
            Payload::Pong(p) => p.encode(&mut stream)?,
            Payload::Addr(p) => p.encode(&mut stream)?,
            Payload::GetAddr(p) => p.encode(&mut stream)?,
            Payload::Inv(p) => p.encode(&mut stream)?,
            Payload::GetData(p) => p.encode(&mut stream)?,
            Payload::NotFound(p) => p.encode(&mut stream)?,
            Payload::GetHeaders(p) => p.encode(&mut stream)?,
            Payload::Headers(p) => p.encode(&mut stream)?,
            Payload::MemPool(p) => p.encode(&mut stream)?,
            Payload::Reject(p) => p.encode(&mut stream)?,
        }
        Ok(stream.into_vec())
    }
}
