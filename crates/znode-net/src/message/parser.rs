use znode_codec::{ByteStream, CompactSize, Decode, Encode, WireSize};

use crate::constants::MAX_MESSAGES_PER_READ;
use crate::error::FramingError;

use super::header::{double_sha256_checksum, MessageHeader};
use super::payloads::Payload;
use super::registry::{lookup_by_tag, MessageTag, RegistryEntry};

/// A message this side is about to send: built once, from a pristine state,
/// never mutated afterward. Distinct from `InboundFrame` per the rewrite
/// note against the source's single dual-purpose `Message` class — it
/// removes the need for a pristine/populated runtime check.
#[derive(Debug, Clone)]
pub struct OutboundFrame {
    pub header: MessageHeader,
    pub payload: Vec<u8>,
}

impl OutboundFrame {
    pub fn build(magic: [u8; 4], tag: MessageTag, payload: Vec<u8>) -> Result<Self, FramingError> {
        let entry = lookup_by_tag(tag).ok_or(FramingError::PushNotPermitted)?;
        if payload.len() < entry.min_payload || payload.len() > entry.max_payload {
            return Err(if payload.len() < entry.min_payload {
                FramingError::UndersizedPayload
            } else {
                FramingError::OversizedPayload
            });
        }
        let mut header = MessageHeader::for_tag(magic, tag).ok_or(FramingError::PushNotPermitted)?;
        header.payload_length = payload.len() as u32;
        header.checksum = double_sha256_checksum(&payload);
        Ok(OutboundFrame { header, payload })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut stream = ByteStream::new();
        self.header.encode(&mut stream).expect("fixed-size header never fails to encode");
        let mut bytes = stream.into_vec();
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    pub fn for_payload(magic: [u8; 4], payload: &Payload) -> Result<Self, FramingError> {
        let body = payload.encode_body().map_err(FramingError::Codec)?;
        Self::build(magic, payload.tag(), body)
    }
}

/// A message received off the wire and fully validated.
#[derive(Debug, Clone)]
pub struct InboundFrame {
    pub header: MessageHeader,
    pub payload: Vec<u8>,
}

impl InboundFrame {
    pub fn tag(&self) -> MessageTag {
        self.header.tag()
    }
}

#[derive(Debug)]
enum ParserState {
    NeedHeader,
    NeedBody {
        header: MessageHeader,
        entry: &'static RegistryEntry,
    },
}

/// Streaming feeder: absorbs arbitrarily-chunked bytes and yields complete,
/// validated messages. One instance lives for the whole lifetime of a
/// session's read side; `feed` is called once per socket read.
pub struct IncrementalParser {
    state: ParserState,
    buffer: ByteStream,
    expected_magic: [u8; 4],
}

impl IncrementalParser {
    pub fn is_awaiting_body(&self) -> bool {
        matches!(self.state, ParserState::NeedBody { .. })
    }

    pub fn new(expected_magic: [u8; 4]) -> Self {
        Self {
            state: ParserState::NeedHeader,
            buffer: ByteStream::new(),
            expected_magic,
        }
    }

    /// Feeds one socket read's worth of bytes and drains as many complete
    /// messages as are available, honoring the per-read flood guard: once
    /// `MAX_MESSAGES_PER_READ` messages have been produced, the remaining
    /// buffered bytes are left for the next call and a `FloodingDetected`
    /// error terminates this read.
    pub fn feed(
        &mut self,
        bytes: &[u8],
        current_protocol_version: u32,
    ) -> Vec<Result<InboundFrame, FramingError>> {
        self.buffer.append(bytes);
        let mut produced = Vec::new();

        loop {
            if produced.len() >= MAX_MESSAGES_PER_READ {
                produced.push(Err(FramingError::FloodingDetected));
                break;
            }

            match &self.state {
                ParserState::NeedHeader => {
                    if self.buffer.avail() < crate::constants::MESSAGE_HEADER_LENGTH {
                        break;
                    }
                    let header = match MessageHeader::decode(&mut self.buffer) {
                        Ok(header) => header,
                        Err(err) => {
                            produced.push(Err(FramingError::from(err)));
                            break;
                        }
                    };
                    let entry = match header.validate(self.expected_magic) {
                        Ok(entry) => entry,
                        Err(err) => {
                            produced.push(Err(err));
                            break;
                        }
                    };
                    if let Some(min_version) = entry.min_protocol_version {
                        if current_protocol_version < min_version {
                            produced
                                .push(Err(FramingError::UnsupportedMessageTypeForProtocolVersion));
                            break;
                        }
                    }
                    if let Some(max_version) = entry.max_protocol_version {
                        if current_protocol_version > max_version {
                            produced
                                .push(Err(FramingError::DeprecatedMessageTypeForProtocolVersion));
                            break;
                        }
                    }
                    if header.payload_length == 0 {
                        match self.finish_message(header, &[]) {
                            Ok(frame) => produced.push(Ok(frame)),
                            Err(err) => {
                                produced.push(Err(err));
                                break;
                            }
                        }
                    } else {
                        self.state = ParserState::NeedBody { header, entry };
                    }
                }
                ParserState::NeedBody { header, entry } => {
                    let needed = header.payload_length as usize;
                    if self.buffer.avail() < needed {
                        break;
                    }
                    let header = header.clone();
                    let entry = *entry;
                    let payload = self.buffer.read(needed).expect("checked above").to_vec();
                    self.state = ParserState::NeedHeader;

                    let checksum = double_sha256_checksum(&payload);
                    if checksum != header.checksum {
                        produced.push(Err(FramingError::InvalidChecksum));
                        break;
                    }
                    if entry.vectorized {
                        if let Err(err) = validate_vectorized_payload(entry, &payload) {
                            produced.push(Err(err));
                            break;
                        }
                    }
                    produced.push(Ok(InboundFrame { header, payload }));
                }
            }
        }

        self.buffer.consume(self.buffer.tell());
        produced
    }

    fn finish_message(
        &mut self,
        header: MessageHeader,
        payload: &[u8],
    ) -> Result<InboundFrame, FramingError> {
        Ok(InboundFrame {
            header,
            payload: payload.to_vec(),
        })
    }
}

/// Validates a vectorized payload's declared item count against the bytes
/// actually present: non-empty, within the tag's cap, and (when the item
/// size is fixed) exactly accounted for with no duplicates.
fn validate_vectorized_payload(entry: &RegistryEntry, payload: &[u8]) -> Result<(), FramingError> {
    let prefix_skip = if entry.tag == MessageTag::GetHeaders { 4 } else { 0 };
    if payload.len() < prefix_skip {
        return Err(FramingError::LengthMismatchesVectorSize);
    }
    let mut stream = ByteStream::from_vec(payload[prefix_skip..].to_vec());
    let count = CompactSize::decode(&mut stream)
        .map_err(FramingError::Codec)?
        .as_usize()
        .map_err(FramingError::Codec)?;

    if count == 0 {
        return Err(FramingError::EmptyVector);
    }
    if count > entry.max_items {
        return Err(FramingError::OversizedVector);
    }

    if entry.item_size > 0 {
        let tail_extra = if entry.tag == MessageTag::GetHeaders { 32 } else { 0 };
        let remaining = stream.avail();
        let items_region = remaining.checked_sub(tail_extra).ok_or(FramingError::LengthMismatchesVectorSize)?;
        let expected = count * entry.item_size;
        if items_region != expected {
            return Err(FramingError::LengthMismatchesVectorSize);
        }

        let items_start = stream.tell();
        let items_bytes = &stream.as_slice()[items_start..items_start + items_region];
        let mut seen: Vec<&[u8]> = Vec::with_capacity(count);
        for chunk in items_bytes.chunks_exact(entry.item_size) {
            if seen.contains(&chunk) {
                return Err(FramingError::DuplicateVectorItems);
            }
            seen.push(chunk);
        }
    }

    Ok(())
}
