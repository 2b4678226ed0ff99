use crate::error::{Error, Result};
use crate::stream::ByteStream;
use crate::traits::{Decode, Encode, WireSize};
use crate::varint::CompactSize;

macro_rules! impl_fixed_int {
    ($ty:ty, $size:expr) => {
        impl WireSize for $ty {
            const FIXED_SIZE: Option<usize> = Some($size);

            fn encoded_len(&self) -> usize {
                $size
            }
        }

        impl Encode for $ty {
            fn encode(&self, out: &mut ByteStream) -> Result<()> {
                out.append(&self.to_le_bytes());
                Ok(())
            }
        }

        impl Decode for $ty {
            fn decode(input: &mut ByteStream) -> Result<Self> {
                let bytes: [u8; $size] = input.read($size)?.try_into().unwrap();
                Ok(<$ty>::from_le_bytes(bytes))
            }
        }
    };
}

impl_fixed_int!(u8, 1);
impl_fixed_int!(i8, 1);
impl_fixed_int!(u16, 2);
impl_fixed_int!(i16, 2);
impl_fixed_int!(u32, 4);
impl_fixed_int!(i32, 4);
impl_fixed_int!(u64, 8);
impl_fixed_int!(i64, 8);

impl WireSize for bool {
    const FIXED_SIZE: Option<usize> = Some(1);

    fn encoded_len(&self) -> usize {
        1
    }
}

impl Encode for bool {
    fn encode(&self, out: &mut ByteStream) -> Result<()> {
        out.append(&[if *self { 1 } else { 0 }]);
        Ok(())
    }
}

impl Decode for bool {
    fn decode(input: &mut ByteStream) -> Result<Self> {
        match input.read(1)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::InvalidEnumValue(other as u32)),
        }
    }
}

/// A fixed-width big-endian byte array, used for hashes and the
/// fixed-precision big integers that appear in headers and addresses.
impl<const N: usize> WireSize for [u8; N] {
    const FIXED_SIZE: Option<usize> = Some(N);

    fn encoded_len(&self) -> usize {
        N
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode(&self, out: &mut ByteStream) -> Result<()> {
        out.append(self);
        Ok(())
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(input: &mut ByteStream) -> Result<Self> {
        let bytes = input.read(N)?;
        let mut array = [0u8; N];
        array.copy_from_slice(bytes);
        Ok(array)
    }
}

/// A compact-size count followed by that many encodings, in order.
impl<T: WireSize> WireSize for Vec<T> {
    const FIXED_SIZE: Option<usize> = None;

    fn encoded_len(&self) -> usize {
        CompactSize(self.len() as u64).encoded_len()
            + self.iter().map(WireSize::encoded_len).sum::<usize>()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, out: &mut ByteStream) -> Result<()> {
        CompactSize(self.len() as u64).encode(out)?;
        for item in self {
            item.encode(out)?;
        }
        Ok(())
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(input: &mut ByteStream) -> Result<Self> {
        let count = CompactSize::decode(input)?.as_usize()?;
        let mut items = Vec::with_capacity(count.min(4096));
        for _ in 0..count {
            items.push(T::decode(input)?);
        }
        Ok(items)
    }
}

/// A length-prefixed, unvalidated UTF-8 string: decoding never fails on
/// account of the bytes, invalid sequences are replaced rather than
/// rejected.
impl WireSize for String {
    const FIXED_SIZE: Option<usize> = None;

    fn encoded_len(&self) -> usize {
        CompactSize(self.len() as u64).encoded_len() + self.len()
    }
}

impl Encode for String {
    fn encode(&self, out: &mut ByteStream) -> Result<()> {
        CompactSize(self.len() as u64).encode(out)?;
        out.append(self.as_bytes());
        Ok(())
    }
}

impl Decode for String {
    fn decode(input: &mut ByteStream) -> Result<Self> {
        let count = CompactSize::decode(input)?.as_usize()?;
        let bytes = input.read(count)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// Trailing bytes whose length is implied by the enclosing frame rather
/// than a prefix of their own: greedily consumes whatever is left.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tail(pub Vec<u8>);

impl WireSize for Tail {
    const FIXED_SIZE: Option<usize> = None;

    fn encoded_len(&self) -> usize {
        self.0.len()
    }
}

impl Encode for Tail {
    fn encode(&self, out: &mut ByteStream) -> Result<()> {
        out.append(&self.0);
        Ok(())
    }
}

impl Decode for Tail {
    fn decode(input: &mut ByteStream) -> Result<Self> {
        Ok(Tail(input.read_to_end().to_vec()))
    }
}

/// A fixed-width 16-byte IPv6 address (v4-mapped for IPv4 peers), encoded
/// as raw bytes with no length prefix.
impl WireSize for std::net::Ipv6Addr {
    const FIXED_SIZE: Option<usize> = Some(16);

    fn encoded_len(&self) -> usize {
        16
    }
}

impl Encode for std::net::Ipv6Addr {
    fn encode(&self, out: &mut ByteStream) -> Result<()> {
        out.append(&self.octets());
        Ok(())
    }
}

impl Decode for std::net::Ipv6Addr {
    fn decode(input: &mut ByteStream) -> Result<Self> {
        let bytes: [u8; 16] = input.read(16)?.try_into().unwrap();
        Ok(std::net::Ipv6Addr::from(bytes))
    }
}
