use sha2::{Digest, Sha256};
use znode_codec::{ByteStream, Decode, Encode, NetCodec, Result as CodecResult, WireSize};

use crate::constants::{COMMAND_FIELD_LENGTH, MAX_PROTOCOL_MESSAGE_LENGTH};
use crate::error::FramingError;

use super::registry::{lookup_by_command, lookup_by_tag, MessageTag, RegistryEntry};

/// First four bytes of SHA-256(SHA-256("")), the checksum every empty-payload
/// message must carry.
pub const EMPTY_PAYLOAD_CHECKSUM: [u8; 4] = [0x5d, 0xf6, 0xe0, 0xe2];

pub fn double_sha256_checksum(payload: &[u8]) -> [u8; 4] {
    let first = Sha256::digest(payload);
    let second = Sha256::digest(first);
    let mut checksum = [0u8; 4];
    checksum.copy_from_slice(&second[..4]);
    checksum
}

/// The fixed 24-byte record every message starts with. Its fields are all
/// fixed-width, so `NetCodec` derives an exact byte-for-byte encoding;
/// everything beyond raw (de)serialization (is this a known command? does
/// the length fit the tag? does the checksum match?) is `validate`'s job,
/// called separately once the caller has a magic and version to check
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, NetCodec)]
pub struct MessageHeader {
    pub magic: [u8; 4],
    command: [u8; COMMAND_FIELD_LENGTH],
    pub payload_length: u32,
    pub checksum: [u8; 4],
}

impl MessageHeader {
    pub fn pristine() -> Self {
        MessageHeader {
            magic: [0; 4],
            command: [0; COMMAND_FIELD_LENGTH],
            payload_length: 0,
            checksum: [0; 4],
        }
    }

    pub fn for_tag(magic: [u8; 4], tag: MessageTag) -> Option<Self> {
        let entry = lookup_by_tag(tag)?;
        let mut command = [0u8; COMMAND_FIELD_LENGTH];
        let bytes = entry.command.as_bytes();
        command[..bytes.len()].copy_from_slice(bytes);
        Some(MessageHeader {
            magic,
            command,
            payload_length: 0,
            checksum: EMPTY_PAYLOAD_CHECKSUM,
        })
    }

    pub fn command_str(&self) -> Option<&str> {
        let nul_at = self.command.iter().position(|&b| b == 0)?;
        std::str::from_utf8(&self.command[..nul_at]).ok()
    }

    /// Validates the command field's shape: at least one non-NUL byte,
    /// printable ASCII, no non-NUL byte after the first NUL.
    fn command_field_is_well_formed(&self) -> Result<(), FramingError> {
        if self.command.iter().all(|&b| b == 0) {
            return Err(FramingError::EmptyCommand);
        }
        let mut seen_nul = false;
        for &byte in &self.command {
            if seen_nul {
                if byte != 0 {
                    return Err(FramingError::MalformedCommand);
                }
                continue;
            }
            if byte == 0 {
                seen_nul = true;
                continue;
            }
            if !(0x20..=0x7E).contains(&byte) {
                return Err(FramingError::MalformedCommand);
            }
        }
        Ok(())
    }

    /// Runs the full header contract (magic, command shape, registry
    /// lookup), returning the resolved registry entry on success.
    pub fn validate(&self, expected_magic: [u8; 4]) -> Result<&'static RegistryEntry, FramingError> {
        if self.magic != expected_magic {
            return Err(FramingError::InvalidMagic);
        }
        self.command_field_is_well_formed()?;
        let command = self.command_str().ok_or(FramingError::MalformedCommand)?;
        let entry = lookup_by_command(command).ok_or(FramingError::UnknownCommand)?;

        let length = self.payload_length as usize;
        if length < entry.min_payload {
            return Err(FramingError::UndersizedPayload);
        }
        if length > entry.max_payload.min(MAX_PROTOCOL_MESSAGE_LENGTH) {
            return Err(FramingError::OversizedPayload);
        }
        if length == 0 && self.checksum != EMPTY_PAYLOAD_CHECKSUM {
            return Err(FramingError::InvalidChecksum);
        }
        Ok(entry)
    }

    pub fn tag(&self) -> MessageTag {
        self.command_str()
            .and_then(lookup_by_command)
            .map(|entry| entry.tag)
            .unwrap_or(MessageTag::MissingOrUnknown)
    }
}
