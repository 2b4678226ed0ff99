//! Byte-exact wire codec. `ByteStream` is the in-memory buffer every typed
//! value is read from and written to; `WireSize`/`Encode`/`Decode` are the
//! traits that know how to do it for a given type; `znode_codec_derive`
//! generates the boring, purely-positional impls for plain structs.

pub mod constants;
mod error;
mod primitives;
mod stream;
mod traits;
mod varint;

pub use error::{Error, Result};
pub use primitives::Tail;
pub use stream::{ByteStream, Scope};
pub use traits::{Decode, Encode, WireSize};
pub use varint::CompactSize;

pub use znode_codec_derive::{Decode, Encode, NetCodec, WireSize};

extern crate self as znode_codec;
