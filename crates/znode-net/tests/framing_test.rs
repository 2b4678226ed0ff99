use znode_net::config::DEFAULT_PROTOCOL_VERSION;
use znode_net::error::FramingError;
use znode_net::message::{
    double_sha256_checksum, IncrementalParser, MessageHeader, MessageTag, OutboundFrame,
    EMPTY_PAYLOAD_CHECKSUM,
};

const MAGIC: [u8; 4] = [0x01, 0x02, 0x03, 0x04];

fn verack_bytes() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(24);
    bytes.extend_from_slice(&MAGIC);
    bytes.extend_from_slice(b"verack\0\0\0\0\0\0");
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&EMPTY_PAYLOAD_CHECKSUM);
    bytes
}

#[test]
fn empty_payload_checksum_matches_the_known_constant() {
    assert_eq!(double_sha256_checksum(&[]), EMPTY_PAYLOAD_CHECKSUM);
}

#[test]
fn checksum_changes_with_the_payload() {
    let a = double_sha256_checksum(b"ping");
    let b = double_sha256_checksum(b"pong");
    assert_ne!(a, b);
}

#[test]
fn header_for_tag_produces_the_empty_payload_checksum() {
    let header = MessageHeader::for_tag(MAGIC, MessageTag::VerAck).unwrap();
    assert_eq!(header.checksum, EMPTY_PAYLOAD_CHECKSUM);
    assert_eq!(header.payload_length, 0);
    assert_eq!(header.command_str(), Some("verack"));
}

#[test]
fn header_validate_rejects_a_wrong_magic() {
    let header = MessageHeader::for_tag(MAGIC, MessageTag::VerAck).unwrap();
    let err = header.validate([0xde, 0xad, 0xbe, 0xef]).unwrap_err();
    assert_eq!(err, FramingError::InvalidMagic);
}

#[test]
fn header_validate_rejects_an_unknown_command() {
    let mut raw = verack_bytes();
    raw[4..16].copy_from_slice(b"bogus\0\0\0\0\0\0\0");
    let header = decode_header(&raw);
    let err = header.validate(MAGIC).unwrap_err();
    assert_eq!(err, FramingError::UnknownCommand);
}

#[test]
fn header_validate_rejects_a_payload_length_below_the_tags_minimum() {
    let mut raw = verack_bytes();
    raw[4..16].copy_from_slice(b"ping\0\0\0\0\0\0\0\0");
    // ping requires an 8-byte nonce; declare zero instead.
    let header = decode_header(&raw);
    let err = header.validate(MAGIC).unwrap_err();
    assert_eq!(err, FramingError::UndersizedPayload);
}

#[test]
fn header_validate_rejects_a_bad_checksum_on_an_empty_payload() {
    let mut raw = verack_bytes();
    raw[20..24].copy_from_slice(&[0, 0, 0, 0]);
    let header = decode_header(&raw);
    let err = header.validate(MAGIC).unwrap_err();
    assert_eq!(err, FramingError::InvalidChecksum);
}

fn decode_header(raw: &[u8]) -> MessageHeader {
    use znode_codec::{ByteStream, Decode};
    let mut stream = ByteStream::from_vec(raw[..24].to_vec());
    MessageHeader::decode(&mut stream).unwrap()
}

#[test]
fn verack_serializes_to_the_exact_expected_bytes() {
    let frame = OutboundFrame::build(MAGIC, MessageTag::VerAck, Vec::new()).unwrap();
    assert_eq!(frame.to_bytes(), verack_bytes());
}

#[test]
fn the_parser_recovers_exactly_one_verack_frame_from_the_expected_bytes() {
    let mut parser = IncrementalParser::new(MAGIC);
    let results = parser.feed(&verack_bytes(), DEFAULT_PROTOCOL_VERSION);
    assert_eq!(results.len(), 1);
    let frame = results.into_iter().next().unwrap().unwrap();
    assert_eq!(frame.tag(), MessageTag::VerAck);
    assert!(frame.payload.is_empty());
}

#[test]
fn the_parser_assembles_a_header_delivered_across_two_reads() {
    let raw = verack_bytes();
    let mut parser = IncrementalParser::new(MAGIC);
    assert!(parser
        .feed(&raw[..10], DEFAULT_PROTOCOL_VERSION)
        .is_empty());
    let results = parser.feed(&raw[10..], DEFAULT_PROTOCOL_VERSION);
    assert_eq!(results.len(), 1);
    assert!(results[0].as_ref().unwrap().tag() == MessageTag::VerAck);
}

#[test]
fn thirty_three_back_to_back_messages_in_one_read_trip_the_flood_guard() {
    let pong = OutboundFrame::build(MAGIC, MessageTag::Pong, 8u64.to_le_bytes().to_vec()).unwrap();
    let one = pong.to_bytes();
    let mut raw = Vec::with_capacity(one.len() * 33);
    for _ in 0..33 {
        raw.extend_from_slice(&one);
    }

    let mut parser = IncrementalParser::new(MAGIC);
    let results = parser.feed(&raw, DEFAULT_PROTOCOL_VERSION);

    assert_eq!(results.len(), 33);
    for ok in &results[..32] {
        assert!(matches!(ok, Ok(frame) if frame.tag() == MessageTag::Pong));
    }
    assert!(matches!(&results[32], Err(FramingError::FloodingDetected)));
}
