use std::net::{Ipv4Addr, Ipv6Addr};

use znode_codec::{ByteStream, Decode, Encode};
use znode_net::address::{Address, Endpoint, ReservationTag, Subnet};

#[test]
fn v4_private_ranges_classify_as_rfc1918() {
    let a = Address::V4(Ipv4Addr::new(10, 0, 0, 1));
    let b = Address::V4(Ipv4Addr::new(192, 168, 1, 1));
    let c = Address::V4(Ipv4Addr::new(172, 20, 0, 1));
    assert_eq!(a.reservation(), ReservationTag::Rfc1918);
    assert_eq!(b.reservation(), ReservationTag::Rfc1918);
    assert_eq!(c.reservation(), ReservationTag::Rfc1918);
    assert!(!a.is_routable());
}

#[test]
fn v4_public_address_is_routable() {
    let addr = Address::V4(Ipv4Addr::new(8, 8, 8, 8));
    assert_eq!(addr.reservation(), ReservationTag::NotReserved);
    assert!(addr.is_routable());
}

#[test]
fn v6_unique_local_classifies_as_rfc4193() {
    let addr = Address::V6(Ipv6Addr::new(0xfd00, 0, 0, 0, 0, 0, 0, 1));
    assert_eq!(addr.reservation(), ReservationTag::Rfc4193);
}

#[test]
fn loopback_is_never_routable_even_if_not_reserved() {
    let addr = Address::V4(Ipv4Addr::new(127, 0, 0, 1));
    assert_eq!(addr.reservation(), ReservationTag::NotReserved);
    assert!(!addr.is_routable());
}

#[test]
fn v4_round_trips_through_the_mapped_v6_wire_form() {
    let original = Address::V4(Ipv4Addr::new(203, 0, 113, 7));
    let mapped = original.to_mapped_v6();
    assert_eq!(Address::from_mapped_v6(mapped), original);
}

#[test]
fn endpoint_encodes_to_eighteen_bytes_with_big_endian_port() {
    let endpoint = Endpoint::new(Address::V4(Ipv4Addr::new(1, 2, 3, 4)), 8233);
    let mut stream = ByteStream::new();
    endpoint.encode(&mut stream).unwrap();
    let bytes = stream.into_vec();
    assert_eq!(bytes.len(), 18);
    assert_eq!(&bytes[16..18], &8233u16.to_be_bytes());

    let mut input = ByteStream::from_vec(bytes);
    let decoded = Endpoint::decode(&mut input).unwrap();
    assert_eq!(decoded, endpoint);
}

#[test]
fn subnet_masks_addresses_to_the_configured_prefix() {
    let subnet = Subnet::new(Address::V4(Ipv4Addr::new(203, 0, 113, 0)), 24).unwrap();
    assert!(subnet.contains(&Address::V4(Ipv4Addr::new(203, 0, 113, 200))));
    assert!(!subnet.contains(&Address::V4(Ipv4Addr::new(203, 0, 114, 1))));
}

#[test]
fn subnet_rejects_a_prefix_longer_than_the_address_family_allows() {
    assert!(Subnet::new(Address::V4(Ipv4Addr::new(1, 2, 3, 4)), 33).is_none());
}
