//! Derive macros for `znode-codec`'s `WireSize`/`Encode`/`Decode` traits.
//!
//! Splits size/serialize/deserialize into three cooperating passes, each
//! threading a struct's fields straight through in declaration order: the
//! wire format here has no per-struct envelope, so field order alone
//! defines a type's layout.

mod deserialize;
mod serialize;
mod size;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

#[proc_macro_derive(WireSize)]
pub fn derive_wire_size(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    TokenStream::from(size::derive_wire_size_impl(&input))
}

#[proc_macro_derive(Encode)]
pub fn derive_encode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let mut expanded = size::derive_wire_size_impl(&input);
    expanded.extend(serialize::derive_encode_impl(&input));
    TokenStream::from(expanded)
}

#[proc_macro_derive(Decode)]
pub fn derive_decode(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    TokenStream::from(deserialize::derive_decode_impl(&input))
}

/// Derives `WireSize`, `Encode` and `Decode` in one shot — the common case
/// for payload structs that round-trip both directions.
#[proc_macro_derive(NetCodec)]
pub fn derive_net_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let mut expanded = size::derive_wire_size_impl(&input);
    expanded.extend(serialize::derive_encode_impl(&input));
    expanded.extend(deserialize::derive_decode_impl(&input));
    TokenStream::from(expanded)
}
