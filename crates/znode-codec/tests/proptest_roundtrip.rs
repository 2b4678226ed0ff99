use proptest::prelude::*;
use znode_codec::{ByteStream, CompactSize, Decode, Encode};

proptest! {
    #[test]
    fn compact_size_roundtrips_for_any_value_within_the_ceiling(
        value in 0u64..=znode_codec::constants::MAX_COMPACT_SIZE,
    ) {
        let mut stream = ByteStream::new();
        CompactSize(value).encode(&mut stream).unwrap();
        prop_assert_eq!(CompactSize::decode(&mut stream).unwrap().0, value);
    }

    #[test]
    fn u32_roundtrips_for_any_value(value: u32) {
        let mut stream = ByteStream::new();
        value.encode(&mut stream).unwrap();
        prop_assert_eq!(u32::decode(&mut stream).unwrap(), value);
    }

    #[test]
    fn string_roundtrips_for_arbitrary_unicode(value in ".*") {
        let mut stream = ByteStream::new();
        value.clone().encode(&mut stream).unwrap();
        prop_assert_eq!(String::decode(&mut stream).unwrap(), value);
    }

    #[test]
    fn byte_vec_roundtrips_for_arbitrary_bytes(value: Vec<u8>) {
        let mut stream = ByteStream::new();
        value.clone().encode(&mut stream).unwrap();
        prop_assert_eq!(Vec::<u8>::decode(&mut stream).unwrap(), value);
    }
}
