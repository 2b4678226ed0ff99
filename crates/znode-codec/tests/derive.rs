use znode_codec::{ByteStream, Decode, Encode, NetCodec, WireSize};

#[derive(Debug, Clone, PartialEq, Eq, NetCodec)]
struct Nonce(u64);

#[derive(Debug, Clone, PartialEq, Eq, NetCodec)]
struct PingPayload {
    nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, NetCodec)]
struct InventoryItem {
    kind: u32,
    hash: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq, NetCodec)]
struct AddressEntry {
    time: u32,
    services: u64,
    ip: [u8; 16],
    port: u16,
}

fn roundtrip<T: Encode + Decode + PartialEq + std::fmt::Debug>(value: T) {
    let mut stream = ByteStream::new();
    value.encode(&mut stream).unwrap();
    assert_eq!(T::decode(&mut stream).unwrap(), value);
}

#[test]
fn tuple_struct_derives_positionally() {
    roundtrip(Nonce(0xAABB_CCDD_EEFF_0011));
}

#[test]
fn named_struct_fields_encode_in_declaration_order() {
    let payload = PingPayload { nonce: 42 };
    let mut stream = ByteStream::new();
    payload.encode(&mut stream).unwrap();
    assert_eq!(stream.as_slice(), &42u64.to_le_bytes());
}

#[test]
fn fixed_size_struct_reports_fixed_size() {
    assert_eq!(InventoryItem::FIXED_SIZE, Some(36));
    assert_eq!(AddressEntry::FIXED_SIZE, Some(30));
}

#[test]
fn nested_fixed_struct_roundtrips() {
    roundtrip(InventoryItem {
        kind: 1,
        hash: [7u8; 32],
    });
    roundtrip(AddressEntry {
        time: 1_700_000_000,
        services: 1,
        ip: [0u8; 16],
        port: 8233,
    });
}

#[test]
fn vec_of_derived_structs_roundtrips() {
    let items = vec![
        InventoryItem {
            kind: 1,
            hash: [1u8; 32],
        },
        InventoryItem {
            kind: 2,
            hash: [2u8; 32],
        },
    ];
    roundtrip(items);
}
