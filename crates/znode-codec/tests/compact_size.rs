use znode_codec::{ByteStream, CompactSize, Decode, Encode, Error};

fn roundtrip(value: u64) -> CompactSize {
    let mut stream = ByteStream::new();
    CompactSize(value).encode(&mut stream).unwrap();
    CompactSize::decode(&mut stream).unwrap()
}

#[test]
fn single_byte_boundary() {
    assert_eq!(roundtrip(0).0, 0);
    assert_eq!(roundtrip(0xFC).0, 0xFC);
}

#[test]
fn u16_boundary() {
    assert_eq!(roundtrip(0xFD).0, 0xFD);
    assert_eq!(roundtrip(0xFFFF).0, 0xFFFF);
}

#[test]
fn u32_boundary() {
    assert_eq!(roundtrip(0x1_0000).0, 0x1_0000);
    assert_eq!(roundtrip(0xFFFF_FFFF).0, 0xFFFF_FFFF);
}

#[test]
fn encoded_len_matches_prefix_width() {
    assert_eq!(CompactSize(0xFC).encoded_len(), 1);
    assert_eq!(CompactSize(0xFD).encoded_len(), 3);
    assert_eq!(CompactSize(0x1_0000).encoded_len(), 5);
    assert_eq!(CompactSize(0xFFFF_FFFF + 1).encoded_len(), 9);
}

#[test]
fn rejects_non_canonical_u16_prefix() {
    let mut stream = ByteStream::new();
    stream.append(&[0xFD, 0xFC, 0x00]); // encodes 0xFC, which fits in one byte
    assert_eq!(
        CompactSize::decode(&mut stream),
        Err(Error::NonCanonicalCompactSize)
    );
}

#[test]
fn rejects_non_canonical_u32_prefix() {
    let mut stream = ByteStream::new();
    stream.append(&[0xFE, 0xFF, 0xFF, 0x00, 0x00]); // encodes 0xFFFF
    assert_eq!(
        CompactSize::decode(&mut stream),
        Err(Error::NonCanonicalCompactSize)
    );
}

#[test]
fn rejects_non_canonical_u64_prefix() {
    let mut stream = ByteStream::new();
    stream.append(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00]); // encodes 0xFFFFFFFF
    assert_eq!(
        CompactSize::decode(&mut stream),
        Err(Error::NonCanonicalCompactSize)
    );
}

#[test]
fn rejects_values_past_the_ceiling() {
    let mut stream = ByteStream::new();
    CompactSize(znode_codec::constants::MAX_COMPACT_SIZE + 1)
        .encode(&mut stream)
        .unwrap();
    assert!(matches!(
        CompactSize::decode(&mut stream),
        Err(Error::CompactSizeTooBig(_))
    ));
}

#[test]
fn at_the_ceiling_is_accepted() {
    let mut stream = ByteStream::new();
    let max = znode_codec::constants::MAX_COMPACT_SIZE;
    CompactSize(max).encode(&mut stream).unwrap();
    assert_eq!(CompactSize::decode(&mut stream).unwrap().0, max);
}
