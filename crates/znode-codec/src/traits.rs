use crate::error::Result;
use crate::stream::ByteStream;

/// How many bytes a value takes on the wire. `FIXED_SIZE` lets callers fold
/// the size of a struct at compile time when every field is itself fixed;
/// `encoded_len` is the fallback (and the only source of truth) once any
/// field is variable-length.
pub trait WireSize {
    const FIXED_SIZE: Option<usize>;

    fn encoded_len(&self) -> usize;
}

/// Writes a value's wire representation to the end of a `ByteStream`.
pub trait Encode: WireSize {
    fn encode(&self, out: &mut ByteStream) -> Result<()>;
}

/// Reads a value's wire representation starting at a `ByteStream`'s cursor.
pub trait Decode: Sized {
    fn decode(input: &mut ByteStream) -> Result<Self>;
}
