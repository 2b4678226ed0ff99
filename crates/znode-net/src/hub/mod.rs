//! `ConnectionHub`: owns every session's lifecycle, the acceptor, the
//! dial-out connector, DNS seeding, and the service/info timers. Sessions
//! report back to the hub over a single inbox channel (`HubEvent`) instead
//! of holding a back-pointer to it — disconnect, traffic, and forwarded
//! payloads are all just values sent into that channel, never a callback
//! closing over `Arc<ConnectionHub>`.

mod acceptor;
mod connector;
mod dns;
mod manual;
mod need_connections;
mod node_factory;
mod routing;
mod sessions;
mod service_timer;
mod info_timer;

pub use connector::ConnectRequest;
pub use routing::RoutedMessage;
pub use sessions::SessionRegistry;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::address::Endpoint;
use crate::config::{socket_addr_to_endpoint, ChainParams, NodeSettings};
use crate::constants::{INFO_TIMER_INTERVAL_SECONDS, STOP_POLL_INTERVAL_SECONDS};
use crate::error::HubError;
use crate::session::{
    ConnectionType, HubEvent, SessionConfig, SessionSnapshot, TlsRoles, TrafficDirection,
    TrafficMeter,
};
use crate::tls::{self, CertificatePolicy};

/// What a newly available socket is handed to the node factory as: an
/// inbound accept or a completed outbound dial, tagged with the connection
/// type it should be registered under.
#[derive(Debug)]
pub enum NodeFactoryJob {
    Inbound { stream: TcpStream, addr: SocketAddr },
    Outbound { stream: TcpStream, addr: SocketAddr, connection_type: ConnectionType },
}

/// Everything the application layer needs from a running hub: its own
/// identity for diagnostics and a channel of demultiplexed inbound
/// messages to act on.
pub struct ConnectionHub {
    chain: Arc<ChainParams>,
    settings: Arc<NodeSettings>,
    registry: Arc<SessionRegistry>,
    session_config: Arc<SessionConfig>,
    local_endpoint: Endpoint,
    tls_roles: Option<TlsRoles>,

    connect_tx: Mutex<Option<mpsc::Sender<ConnectRequest>>>,
    routed_tx: mpsc::Sender<RoutedMessage>,
    need_connections: Arc<Notify>,
    traffic: Arc<TrafficMeter>,
    active_connections_gauge: Arc<AtomicUsize>,
    dns_attempts: Arc<AtomicUsize>,
    stopping: Arc<AtomicBool>,

    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl ConnectionHub {
    /// Builds a hub from chain parameters and node settings, normalizing
    /// the nonce and resolving TLS material if `use_tls` is set. Returns
    /// the hub plus the receiving end of its routed-message channel; the
    /// application layer reads from that channel to act on addr/inv/
    /// getdata/notfound/headers/reject/mempool/getaddr traffic.
    pub fn new(
        chain: ChainParams,
        mut settings: NodeSettings,
        tls_cert_dir: Option<&std::path::Path>,
        allow_self_signed_generation: bool,
    ) -> Result<(Arc<Self>, mpsc::Receiver<RoutedMessage>), HubError> {
        settings.normalize();
        let local_addr = acceptor::resolve_local_addr(&settings, chain.default_port);
        let local_endpoint = socket_addr_to_endpoint(local_addr);

        let tls_roles = if settings.use_tls {
            Some(build_tls_roles(&settings, tls_cert_dir, allow_self_signed_generation)?)
        } else {
            None
        };

        let chain = Arc::new(chain);
        let settings = Arc::new(settings);
        let session_config = Arc::new(SessionConfig::new(&chain, &settings, local_endpoint));

        let (routed_tx, routed_rx) = mpsc::channel(1024);
        let hub = Arc::new(ConnectionHub {
            chain,
            settings,
            registry: Arc::new(SessionRegistry::new()),
            session_config,
            local_endpoint,
            tls_roles,
            connect_tx: Mutex::new(None),
            routed_tx,
            need_connections: Arc::new(Notify::new()),
            traffic: Arc::new(TrafficMeter::new()),
            active_connections_gauge: Arc::new(AtomicUsize::new(0)),
            dns_attempts: Arc::new(AtomicUsize::new(0)),
            stopping: Arc::new(AtomicBool::new(false)),
            tasks: Mutex::new(Vec::new()),
        });
        Ok((hub, routed_rx))
    }

    pub fn size(&self) -> usize {
        self.registry.len()
    }

    pub fn sessions(&self) -> Vec<SessionSnapshot> {
        self.registry.snapshots()
    }

    pub fn local_endpoint(&self) -> Endpoint {
        self.local_endpoint
    }

    /// Queues a manual outbound dial through the same connector every other
    /// candidate goes through, e.g. for an RPC-triggered "add node" request.
    pub async fn request_outbound(&self, addr: SocketAddr, connection_type: ConnectionType) {
        if let Some(tx) = self.connect_tx.lock().unwrap().clone() {
            let _ = tx.send(ConnectRequest { addr, connection_type }).await;
        }
    }

    /// Starts the acceptor, connector, node factory, DNS/manual-node
    /// supply, and the two maintenance timers. Returns once everything is
    /// spawned; the hub continues running on its own tasks.
    pub fn start(self: &Arc<Self>) -> Result<(), HubError> {
        let routed_tx = self.routed_tx.clone();
        let local_addr = acceptor::resolve_local_addr(&self.settings, self.chain.default_port);
        let listener = acceptor::bind(local_addr)?;

        let (connect_tx, connect_rx) = mpsc::channel::<ConnectRequest>(self.settings.max_active_connections.max(1));
        let (node_factory_tx, node_factory_rx) =
            mpsc::channel::<NodeFactoryJob>(self.settings.max_active_connections.max(1));
        let (hub_tx, hub_rx) = mpsc::channel::<HubEvent>(1024);

        *self.connect_tx.lock().unwrap() = Some(connect_tx.clone());

        let mut tasks = Vec::new();

        tasks.push(tokio::spawn(acceptor::run(
            listener,
            Arc::clone(&self.settings),
            Arc::clone(&self.registry),
            node_factory_tx.clone(),
        )));

        tasks.push(tokio::spawn(connector::run(
            connect_rx,
            node_factory_tx.clone(),
            Arc::clone(&self.need_connections),
            Arc::clone(&self.settings),
            Arc::clone(&self.registry),
        )));

        tasks.push(tokio::spawn(node_factory::run(
            node_factory_rx,
            Arc::clone(&self.settings),
            Arc::clone(&self.session_config),
            Arc::clone(&self.registry),
            self.tls_roles.clone(),
            hub_tx.clone(),
            self.local_endpoint,
        )));

        tasks.push(tokio::spawn(need_connections::run(
            Arc::clone(&self.chain),
            Arc::clone(&self.settings),
            Arc::clone(&self.registry),
            connect_tx.clone(),
            Arc::clone(&self.need_connections),
            Arc::clone(&self.dns_attempts),
        )));

        tasks.push(tokio::spawn(manual::run(
            self.settings.manual_endpoints(),
            Arc::clone(&self.registry),
            connect_tx.clone(),
        )));

        tasks.push(tokio::spawn(service_timer::run(
            Arc::clone(&self.registry),
            Arc::clone(&self.active_connections_gauge),
            Arc::clone(&self.stopping),
        )));

        tasks.push(tokio::spawn(info_timer::run(
            Arc::clone(&self.registry),
            Arc::clone(&self.traffic),
            INFO_TIMER_INTERVAL_SECONDS,
        )));

        tasks.push(tokio::spawn(run_event_loop(
            hub_rx,
            Arc::clone(&self.registry),
            Arc::clone(&self.settings),
            connect_tx,
            Arc::clone(&self.traffic),
            Arc::clone(&self.need_connections),
            routed_tx,
        )));

        *self.tasks.lock().unwrap() = tasks;
        info!(local = %self.local_endpoint, "connection hub started");
        Ok(())
    }

    /// Closes the acceptor and the outbound-request channel, then polls
    /// until the registry is empty (the service timer, now in its
    /// shutdown mode, asks a bounded batch of sessions to stop each tick),
    /// and finally cancels every remaining task.
    pub async fn stop(&self) {
        self.stopping.store(true, Ordering::Release);
        *self.connect_tx.lock().unwrap() = None;

        let mut tasks = self.tasks.lock().unwrap().split_off(0);
        if let Some(acceptor_task) = tasks.first() {
            acceptor_task.abort();
        }

        while !self.registry.is_empty() {
            tokio::time::sleep(Duration::from_secs(STOP_POLL_INTERVAL_SECONDS)).await;
        }

        for task in tasks.drain(..) {
            task.abort();
        }
        info!("connection hub stopped");
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_event_loop(
    mut hub_rx: mpsc::Receiver<HubEvent>,
    registry: Arc<SessionRegistry>,
    settings: Arc<NodeSettings>,
    connect_tx: mpsc::Sender<ConnectRequest>,
    traffic: Arc<TrafficMeter>,
    need_connections: Arc<Notify>,
    routed_tx: mpsc::Sender<RoutedMessage>,
) {
    while let Some(event) = hub_rx.recv().await {
        match event {
            HubEvent::Disconnected(id) => {
                if registry.remove(id).is_some()
                    && registry.active_outbound_count() < settings.min_outgoing_connections
                {
                    need_connections.notify_one();
                }
            }
            HubEvent::DataBytes(_id, direction, n) => match direction {
                TrafficDirection::Inbound => traffic.add_received(n as u64),
                TrafficDirection::Outbound => traffic.add_sent(n as u64),
            },
            HubEvent::InboundPayload(session_id, payload) => {
                routing::route(session_id, payload, &registry, &settings, &connect_tx, &routed_tx)
                    .await;
            }
        }
    }
}

fn build_tls_roles(
    settings: &NodeSettings,
    tls_cert_dir: Option<&std::path::Path>,
    allow_self_signed_generation: bool,
) -> Result<TlsRoles, HubError> {
    let (certs, key) = match tls_cert_dir {
        Some(dir) => {
            let cert_path = dir.join("cert.pem");
            let key_path = dir.join("key.pem");
            match tls::load_material(&cert_path, &key_path, settings.tls_password.as_deref())? {
                Some(material) => material,
                None if allow_self_signed_generation => {
                    warn!(
                        dir = %dir.display(),
                        "no TLS material found, generating a self-signed certificate"
                    );
                    tls::generate_self_signed()?
                }
                None => {
                    return Err(HubError::Tls(format!(
                        "no TLS material in {} and self-signed generation was not permitted",
                        dir.display()
                    )))
                }
            }
        }
        None if allow_self_signed_generation => tls::generate_self_signed()?,
        None => {
            return Err(HubError::Tls(
                "use_tls is set but no certificate directory was given".to_string(),
            ))
        }
    };

    let server = tls::server_config(certs, key)?;
    let client = tls::client_config(CertificatePolicy::Insecure)?;
    Ok(TlsRoles { server, client })
}
