use crate::constants::MAX_COMPACT_SIZE;
use crate::error::{Error, Result};
use crate::stream::ByteStream;
use crate::traits::{Decode, Encode, WireSize};

/// Variable-length encoding for an unsigned integer, used for every count
/// and length prefix on the wire. Decoding rejects any encoding that isn't
/// the shortest possible one for the value (non-canonical), and any value
/// past `MAX_COMPACT_SIZE` regardless of how it was encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CompactSize(pub u64);

impl From<usize> for CompactSize {
    fn from(value: usize) -> Self {
        CompactSize(value as u64)
    }
}

impl CompactSize {
    pub fn as_usize(self) -> Result<usize> {
        usize::try_from(self.0).map_err(|_| Error::Overflow)
    }
}

impl WireSize for CompactSize {
    const FIXED_SIZE: Option<usize> = None;

    fn encoded_len(&self) -> usize {
        match self.0 {
            0..=0xFC => 1,
            0xFD..=0xFFFF => 3,
            0x1_0000..=0xFFFF_FFFF => 5,
            _ => 9,
        }
    }
}

impl Encode for CompactSize {
    fn encode(&self, out: &mut ByteStream) -> Result<()> {
        match self.0 {
            n @ 0..=0xFC => out.append(&[n as u8]),
            n @ 0xFD..=0xFFFF => {
                out.append(&[0xFD]);
                out.append(&(n as u16).to_le_bytes());
            }
            n @ 0x1_0000..=0xFFFF_FFFF => {
                out.append(&[0xFE]);
                out.append(&(n as u32).to_le_bytes());
            }
            n => {
                out.append(&[0xFF]);
                out.append(&n.to_le_bytes());
            }
        }
        Ok(())
    }
}

impl Decode for CompactSize {
    fn decode(input: &mut ByteStream) -> Result<Self> {
        let prefix = input.read(1)?[0];
        let value = match prefix {
            0xFF => {
                let bytes: [u8; 8] = input.read(8)?.try_into().unwrap();
                let value = u64::from_le_bytes(bytes);
                if value <= 0xFFFF_FFFF {
                    return Err(Error::NonCanonicalCompactSize);
                }
                value
            }
            0xFE => {
                let bytes: [u8; 4] = input.read(4)?.try_into().unwrap();
                let value = u32::from_le_bytes(bytes) as u64;
                if value <= 0xFFFF {
                    return Err(Error::NonCanonicalCompactSize);
                }
                value
            }
            0xFD => {
                let bytes: [u8; 2] = input.read(2)?.try_into().unwrap();
                let value = u16::from_le_bytes(bytes) as u64;
                if value <= 0xFC {
                    return Err(Error::NonCanonicalCompactSize);
                }
                value
            }
            small => small as u64,
        };
        if value > MAX_COMPACT_SIZE {
            return Err(Error::CompactSizeTooBig(value));
        }
        Ok(CompactSize(value))
    }
}
