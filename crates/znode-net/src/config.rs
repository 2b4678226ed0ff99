use std::net::SocketAddr;

use rand::Rng;
use serde::Deserialize;

use crate::address::Endpoint;

pub const DEFAULT_PROTOCOL_VERSION: u32 = 70016;
pub const MIN_SUPPORTED_PROTOCOL_VERSION: u32 = 70002;
pub const MAX_SUPPORTED_PROTOCOL_VERSION: u32 = 70016;

/// Chain-specific constants consumed from outside this crate: which network
/// a node is speaking to, and where to find its peers.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainParams {
    pub magic: [u8; 4],
    pub default_port: u16,
    pub dns_seeds: Vec<String>,
}

impl ChainParams {
    pub fn mainnet() -> Self {
        ChainParams {
            magic: [0x24, 0xe9, 0x27, 0x64],
            default_port: 8233,
            dns_seeds: vec![
                "dnsseed.z.cash".to_string(),
                "dnsseed.str4d.xyz".to_string(),
            ],
        }
    }

    pub fn testnet() -> Self {
        ChainParams {
            magic: [0xfa, 0x1a, 0xf9, 0xbf],
            default_port: 18233,
            dns_seeds: vec!["dnsseed.testnet.z.cash".to_string()],
        }
    }
}

/// NAT traversal knobs, out of scope to actually implement here (UPnP/NAT-PMP
/// client code lives outside this crate) but carried through settings so the
/// application layer can act on them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NatSettings {
    pub upnp: bool,
    pub external_ip: Option<String>,
}

/// Everything the connection hub needs to start, consumed from an external
/// settings struct (typically loaded from TOML plus CLI overrides by the
/// application binary).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    pub local_endpoint: String,
    pub use_tls: bool,
    pub tls_password: Option<String>,
    pub max_active_connections: usize,
    pub max_active_connections_per_ip: usize,
    pub min_outgoing_connections: usize,
    pub ipv4_only: bool,
    pub nonce: u64,
    pub idle_timeout_seconds: u64,
    pub inbound_timeout_seconds: u64,
    pub outbound_timeout_seconds: u64,
    pub protocol_handshake_timeout_seconds: u64,
    pub ping_interval_seconds: u64,
    pub ping_timeout_milliseconds: u64,
    pub connect_nodes: Vec<String>,
    pub force_dns_seeding: bool,
    pub nat: NatSettings,
}

impl Default for NodeSettings {
    fn default() -> Self {
        NodeSettings {
            local_endpoint: "0.0.0.0:8233".to_string(),
            use_tls: false,
            tls_password: None,
            max_active_connections: 125,
            max_active_connections_per_ip: 3,
            min_outgoing_connections: 8,
            ipv4_only: false,
            nonce: 0,
            idle_timeout_seconds: 90 * 60,
            inbound_timeout_seconds: 20,
            outbound_timeout_seconds: 20,
            protocol_handshake_timeout_seconds: 60,
            ping_interval_seconds: 120,
            ping_timeout_milliseconds: 20_000,
            connect_nodes: Vec::new(),
            force_dns_seeding: false,
            nat: NatSettings::default(),
        }
    }
}

impl NodeSettings {
    /// Replaces a zero nonce with a random nonzero one.
    pub fn normalize(&mut self) {
        if self.nonce == 0 {
            self.nonce = loop {
                let candidate: u64 = rand::thread_rng().gen();
                if candidate != 0 {
                    break candidate;
                }
            };
        }
    }

    pub fn local_socket_addr(&self) -> std::io::Result<SocketAddr> {
        self.local_endpoint
            .parse()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::InvalidInput, "invalid local_endpoint"))
    }

    pub fn manual_endpoints(&self) -> Vec<SocketAddr> {
        self.connect_nodes
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect()
    }
}

pub fn socket_addr_to_endpoint(addr: SocketAddr) -> Endpoint {
    Endpoint::new(crate::address::Address::from_ip(addr.ip()), addr.port())
}
