//! Peer-to-peer networking core: wire message framing built on
//! `znode_codec`, the per-connection handshake and I/O pumps, and the
//! connection hub that accepts, dials, and supervises a swarm of them.

pub mod address;
pub mod config;
pub mod constants;
pub mod error;
pub mod hub;
pub mod message;
pub mod session;
pub mod tls;
