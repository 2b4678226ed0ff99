use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use znode_codec::{ByteStream, Decode, Encode, Result as CodecResult, WireSize};

/// A reservation block an address can fall into, tested in a fixed priority
/// order (first match wins) because the ranges are not mutually exclusive at
/// the bit level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationTag {
    Rfc1918,
    Rfc3927,
    Rfc2544,
    Rfc6598,
    Rfc5737,
    Rfc3849,
    Rfc3964,
    Rfc4193,
    Rfc4380,
    Rfc4843,
    Rfc4862,
    Rfc6052,
    Rfc6145,
    NotReserved,
}

/// A node address: IPv4 or IPv6. Always serialized as a 16-byte v4-mapped
/// IPv6 value, but classification and display keep the original family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    V4(Ipv4Addr),
    V6(Ipv6Addr),
}

impl Address {
    pub fn from_ip(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => Address::V4(v4),
            IpAddr::V6(v6) => Address::V6(v6),
        }
    }

    pub fn to_ip(self) -> IpAddr {
        match self {
            Address::V4(v4) => IpAddr::V4(v4),
            Address::V6(v6) => IpAddr::V6(v6),
        }
    }

    /// The 16-byte wire form: IPv4 is mapped into `::ffff:a.b.c.d`.
    pub fn to_mapped_v6(self) -> Ipv6Addr {
        match self {
            Address::V4(v4) => v4.to_ipv6_mapped(),
            Address::V6(v6) => v6,
        }
    }

    /// Recovers the original family from a 16-byte wire value: the high 96
    /// bits being the v4-mapped prefix means the value is really an IPv4.
    pub fn from_mapped_v6(mapped: Ipv6Addr) -> Self {
        match mapped.to_ipv4_mapped() {
            Some(v4) => Address::V4(v4),
            None => Address::V6(mapped),
        }
    }

    pub fn is_unspecified(&self) -> bool {
        match self {
            Address::V4(a) => a.is_unspecified(),
            Address::V6(a) => a.is_unspecified(),
        }
    }

    pub fn is_loopback(&self) -> bool {
        match self {
            Address::V4(a) => a.is_loopback(),
            Address::V6(a) => a.is_loopback(),
        }
    }

    pub fn is_multicast(&self) -> bool {
        match self {
            Address::V4(a) => a.is_multicast(),
            Address::V6(a) => a.is_multicast(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.is_unspecified()
    }

    /// Routable: valid, not loopback, and not inside one of the reserved
    /// blocks the original treats as unroutable. RFC3964 (6to4), RFC4380
    /// (Teredo), RFC6052 (NAT64) and RFC6145 (translated v4-in-v6) are
    /// transition mechanisms the original still considers routable, so
    /// they are deliberately absent from this exclusion set.
    pub fn is_routable(&self) -> bool {
        if !self.is_valid() || self.is_loopback() {
            return false;
        }
        !matches!(
            self.reservation(),
            ReservationTag::Rfc1918
                | ReservationTag::Rfc2544
                | ReservationTag::Rfc3927
                | ReservationTag::Rfc4862
                | ReservationTag::Rfc6598
                | ReservationTag::Rfc5737
                | ReservationTag::Rfc4193
                | ReservationTag::Rfc4843
                | ReservationTag::Rfc3849
        )
    }

    pub fn reservation(&self) -> ReservationTag {
        match self {
            Address::V4(a) => classify_v4(*a),
            Address::V6(a) => classify_v6(*a),
        }
    }
}

fn classify_v4(addr: Ipv4Addr) -> ReservationTag {
    let octets = addr.octets();
    if octets[0] == 10
        || (octets[0] == 172 && (16..=31).contains(&octets[1]))
        || (octets[0] == 192 && octets[1] == 168)
    {
        return ReservationTag::Rfc1918;
    }
    if octets[0] == 169 && octets[1] == 254 {
        return ReservationTag::Rfc3927;
    }
    if octets[0] == 192 && octets[1] == 18 || (octets[0] == 192 && octets[1] == 19) {
        return ReservationTag::Rfc2544;
    }
    if octets[0] == 100 && (64..=127).contains(&octets[1]) {
        return ReservationTag::Rfc6598;
    }
    if (octets[0] == 192 && octets[1] == 0 && octets[2] == 2)
        || (octets[0] == 198 && octets[1] == 51 && octets[2] == 100)
        || (octets[0] == 203 && octets[1] == 0 && octets[2] == 113)
    {
        return ReservationTag::Rfc5737;
    }
    ReservationTag::NotReserved
}

fn classify_v6(addr: Ipv6Addr) -> ReservationTag {
    let segments = addr.segments();
    if segments[0] == 0x2001 && segments[1] == 0x0db8 {
        return ReservationTag::Rfc3849;
    }
    if segments[0] == 0x2002 {
        return ReservationTag::Rfc3964;
    }
    if (segments[0] & 0xfe00) == 0xfc00 {
        return ReservationTag::Rfc4193;
    }
    if segments[0] == 0x2001 && segments[1] == 0x0000 {
        return ReservationTag::Rfc4380;
    }
    if segments[0] == 0x2001 && (0x10..=0x1f).contains(&segments[1]) {
        return ReservationTag::Rfc4843;
    }
    if segments[0] == 0xfe80 {
        return ReservationTag::Rfc4862;
    }
    if segments[0] == 0x0064 && segments[1] == 0xff9b && segments[2..6] == [0, 0, 0, 0] {
        return ReservationTag::Rfc6052;
    }
    if segments[0] == 0x0064 && segments[1] == 0xff9b {
        return ReservationTag::Rfc6145;
    }
    ReservationTag::NotReserved
}

impl WireSize for Address {
    const FIXED_SIZE: Option<usize> = Some(16);

    fn encoded_len(&self) -> usize {
        16
    }
}

impl Encode for Address {
    fn encode(&self, out: &mut ByteStream) -> CodecResult<()> {
        self.to_mapped_v6().encode(out)
    }
}

impl Decode for Address {
    fn decode(input: &mut ByteStream) -> CodecResult<Self> {
        Ipv6Addr::decode(input).map(Address::from_mapped_v6)
    }
}

/// An address plus a port, as carried on the wire in `addr` and `version`
/// payloads: 16-byte address followed by a big-endian port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub address: Address,
    pub port: u16,
}

impl Endpoint {
    pub fn new(address: Address, port: u16) -> Self {
        Self { address, port }
    }

    pub fn is_valid(&self) -> bool {
        self.address.is_valid() && self.port > 1 && self.port < 65535
    }
}

impl WireSize for Endpoint {
    const FIXED_SIZE: Option<usize> = Some(18);

    fn encoded_len(&self) -> usize {
        18
    }
}

impl Encode for Endpoint {
    fn encode(&self, out: &mut ByteStream) -> CodecResult<()> {
        self.address.encode(out)?;
        // port is big-endian on the wire, unlike every other integer field
        out.append(&self.port.to_be_bytes());
        Ok(())
    }
}

impl Decode for Endpoint {
    fn decode(input: &mut ByteStream) -> CodecResult<Self> {
        let address = Address::decode(input)?;
        let bytes: [u8; 2] = input.read(2)?.try_into().unwrap();
        Ok(Endpoint {
            address,
            port: u16::from_be_bytes(bytes),
        })
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.address.to_ip(), self.port)
    }
}

/// A base address plus a prefix length, used for per-IP and per-subnet caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subnet {
    base: Address,
    prefix_len: u8,
}

impl Subnet {
    /// Masks `addr` down to `prefix_len` bits and stores the result as the
    /// subnet's base, so two addresses in the same subnet always compare
    /// equal bases.
    pub fn new(addr: Address, prefix_len: u8) -> Option<Self> {
        let max_prefix = match addr {
            Address::V4(_) => 32,
            Address::V6(_) => 128,
        };
        if prefix_len == 0 || prefix_len > max_prefix {
            return None;
        }
        Some(Subnet {
            base: mask_address(addr, prefix_len),
            prefix_len,
        })
    }

    pub fn contains(&self, addr: &Address) -> bool {
        match (self.base, addr) {
            (Address::V4(_), Address::V4(_)) | (Address::V6(_), Address::V6(_)) => {
                mask_address(*addr, self.prefix_len) == self.base
            }
            _ => false,
        }
    }
}

fn mask_address(addr: Address, prefix_len: u8) -> Address {
    match addr {
        Address::V4(v4) => {
            let mask = if prefix_len == 0 {
                0
            } else {
                u32::MAX << (32 - prefix_len)
            };
            Address::V4(Ipv4Addr::from(u32::from(v4) & mask))
        }
        Address::V6(v6) => {
            let mask: u128 = if prefix_len == 0 {
                0
            } else {
                u128::MAX << (128 - prefix_len)
            };
            Address::V6(Ipv6Addr::from(u128::from(v6) & mask))
        }
    }
}
