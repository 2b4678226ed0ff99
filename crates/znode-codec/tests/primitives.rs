use std::net::Ipv6Addr;
use znode_codec::{ByteStream, Decode, Encode, Tail};

fn roundtrip<T: Encode + Decode + PartialEq + std::fmt::Debug>(value: T) {
    let mut stream = ByteStream::new();
    value.encode(&mut stream).unwrap();
    assert_eq!(stream.size(), value.encoded_len());
    let decoded = T::decode(&mut stream).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn fixed_width_integers_roundtrip() {
    roundtrip(0u8);
    roundtrip(255u8);
    roundtrip(-1i8);
    roundtrip(0xBEEFu16);
    roundtrip(-12345i32);
    roundtrip(0xDEAD_BEEF_u32);
    roundtrip(i64::MIN);
    roundtrip(u64::MAX);
}

#[test]
fn integers_are_little_endian_on_the_wire() {
    let mut stream = ByteStream::new();
    0x0102_0304_u32.encode(&mut stream).unwrap();
    assert_eq!(stream.as_slice(), &[0x04, 0x03, 0x02, 0x01]);
}

#[test]
fn bool_roundtrips_and_rejects_other_bytes() {
    roundtrip(true);
    roundtrip(false);

    let mut stream = ByteStream::new();
    stream.append(&[2]);
    assert!(bool::decode(&mut stream).is_err());
}

#[test]
fn fixed_byte_array_roundtrips() {
    roundtrip([0u8; 32]);
    let mut hash = [0u8; 32];
    hash[0] = 0xFF;
    hash[31] = 0x01;
    roundtrip(hash);
}

#[test]
fn string_roundtrips_with_length_prefix() {
    roundtrip(String::from("znode/0.1.0"));
    roundtrip(String::new());
}

#[test]
fn string_decode_never_fails_on_invalid_utf8() {
    let mut stream = ByteStream::new();
    vec![0xFFu8, 0xFE, 0x00].encode(&mut stream).unwrap();
    let decoded = String::decode(&mut stream).unwrap();
    assert!(decoded.contains('\u{FFFD}'));
}

#[test]
fn vec_of_fixed_items_roundtrips() {
    roundtrip::<Vec<u32>>(vec![1, 2, 3, 4]);
    roundtrip::<Vec<u32>>(vec![]);
}

#[test]
fn byte_vec_roundtrips() {
    roundtrip(vec![1u8, 2, 3, 4, 5]);
}

#[test]
fn tail_consumes_remaining_bytes_without_a_prefix() {
    let mut stream = ByteStream::new();
    stream.append(&[1, 2, 3]);
    let tail = Tail::decode(&mut stream).unwrap();
    assert_eq!(tail.0, vec![1, 2, 3]);
    assert_eq!(stream.avail(), 0);
}

#[test]
fn ipv6_address_roundtrips_as_sixteen_raw_bytes() {
    roundtrip(Ipv6Addr::LOCALHOST);
    roundtrip(Ipv6Addr::UNSPECIFIED);
    roundtrip("2001:db8::1".parse::<Ipv6Addr>().unwrap());
}
