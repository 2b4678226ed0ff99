//! Acceptor loop. Binds the local listening socket with reuse-address,
//! no-delay, keep-alive, and 64 KiB socket buffers, then hands every
//! accepted connection to the node factory, subject to the global
//! connection cap. A failed accept is logged and the loop continues;
//! there is no retry budget to exhaust here, only the next `accept()`.

use std::net::SocketAddr;

use socket2::{Domain, Socket, TcpKeepalive, Type};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::NodeSettings;
use crate::constants::SOCKET_BUFFER_SIZE;
use crate::error::HubError;

use super::sessions::SessionRegistry;
use super::NodeFactoryJob;
use std::sync::Arc;

/// Builds a `TcpListener` with reuse-address, no-delay, keep-alive, and
/// explicit 64 KiB socket buffers. `tokio::net::TcpListener::bind` alone
/// can't set keep-alive or buffer sizes, so the socket is built and
/// configured through `socket2` first and only converted to a tokio
/// listener at the end.
pub fn bind(addr: SocketAddr) -> Result<TcpListener, HubError> {
    let domain = if addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
    let socket = Socket::new(domain, Type::STREAM, None).map_err(|source| HubError::Bind {
        endpoint: addr.to_string(),
        source,
    })?;
    socket
        .set_reuse_address(true)
        .map_err(|source| HubError::Bind { endpoint: addr.to_string(), source })?;
    socket
        .set_nodelay(true)
        .map_err(|source| HubError::Bind { endpoint: addr.to_string(), source })?;
    socket
        .set_tcp_keepalive(&TcpKeepalive::new())
        .map_err(|source| HubError::Bind { endpoint: addr.to_string(), source })?;
    socket
        .set_recv_buffer_size(SOCKET_BUFFER_SIZE)
        .map_err(|source| HubError::Bind { endpoint: addr.to_string(), source })?;
    socket
        .set_send_buffer_size(SOCKET_BUFFER_SIZE)
        .map_err(|source| HubError::Bind { endpoint: addr.to_string(), source })?;
    socket
        .bind(&addr.into())
        .map_err(|source| HubError::Bind { endpoint: addr.to_string(), source })?;
    socket
        .listen(1024)
        .map_err(|source| HubError::Bind { endpoint: addr.to_string(), source })?;
    socket
        .set_nonblocking(true)
        .map_err(|source| HubError::Bind { endpoint: addr.to_string(), source })?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener).map_err(|source| HubError::Bind {
        endpoint: addr.to_string(),
        source,
    })
}

/// Resolves the endpoint the acceptor should bind: `settings.local_endpoint`
/// parsed as-is, or, if it carries no port (or fails to parse), the wildcard
/// address at the chain's default port.
pub fn resolve_local_addr(settings: &NodeSettings, chain_default_port: u16) -> SocketAddr {
    settings
        .local_socket_addr()
        .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], chain_default_port)))
}

pub async fn run(
    listener: TcpListener,
    settings: Arc<NodeSettings>,
    registry: Arc<SessionRegistry>,
    node_factory_tx: mpsc::Sender<NodeFactoryJob>,
) {
    info!(local_addr = %listener.local_addr().map(|a| a.to_string()).unwrap_or_default(), "acceptor listening");
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                if registry.len() >= settings.max_active_connections {
                    registry.mark_rejected();
                    debug!(peer = %peer_addr, "rejecting inbound connection: max_active_connections reached");
                    drop(stream);
                    continue;
                }
                if registry.per_ip_count(peer_addr.ip()) >= settings.max_active_connections_per_ip {
                    registry.mark_rejected();
                    debug!(peer = %peer_addr, "rejecting inbound connection: per-ip cap reached");
                    drop(stream);
                    continue;
                }
                stream.set_nodelay(true).ok();
                if node_factory_tx
                    .send(NodeFactoryJob::Inbound { stream, addr: peer_addr })
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Err(err) => {
                warn!(error = %err, "accept failed, continuing to accept");
            }
        }
    }
}

