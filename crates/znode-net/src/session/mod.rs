//! `PeerSession`: one task pair per TCP/TLS connection, driving the
//! handshake state machine and the read/write pumps. Disconnects, traffic,
//! and forwarded payloads are reported to the hub over a single `mpsc`
//! channel rather than through a back-pointer, so a session never holds a
//! reference to the hub that owns it.

mod handshake;
mod ping;
mod traffic;

pub use handshake::{apply_transition, ConnectionType, Direction, HandshakeAction, HandshakeStatus};
pub use ping::PingMeter;
pub use traffic::{TrafficMeter, TrafficSnapshot};

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Notify};
use tracing::{trace, warn};

use crate::address::Endpoint;
use crate::config::{
    ChainParams, NodeSettings, DEFAULT_PROTOCOL_VERSION, MAX_SUPPORTED_PROTOCOL_VERSION,
    MIN_SUPPORTED_PROTOCOL_VERSION,
};
use crate::constants::MAX_BYTES_PER_IO;
use crate::error::{FramingError, IdleReason, SessionError, SessionStopError};
use crate::message::{
    GetAddrPayload, IncrementalParser, MessageTag, OutboundFrame, Payload, PingPayload,
    PongPayload, VerAckPayload, VersionPayload,
};
use crate::tls::CertificatePolicy;

/// Priority of an outbound message: `High` drains before any `Normal`
/// message, FIFO within a level. Handshake replies (VerAck, Pong) and the
/// initial Version are always `High` so they are never stuck behind bulk
/// traffic like `headers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Normal,
    High,
}

/// Direction of raw bytes for the hub's traffic accounting callback —
/// distinct from `handshake::Direction`, which is about who sent a given
/// *message*, not which way bytes moved on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficDirection {
    Inbound,
    Outbound,
}

/// What a session reports to the hub. Replaces the source's captured-`this`
/// callbacks (`on_data`, `on_message`, the disconnect signal) with explicit
/// values sent into the hub's single inbox channel.
#[derive(Debug)]
pub enum HubEvent {
    Disconnected(u64),
    DataBytes(u64, TrafficDirection, usize),
    InboundPayload(u64, Payload),
}

/// Parameters a session needs that come from chain parameters and node
/// settings, pre-resolved into the types/units the session actually uses.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub magic: [u8; 4],
    pub local_nonce: u64,
    pub local_protocol_version: u32,
    pub idle_timeout: Duration,
    pub inbound_timeout: Duration,
    pub outbound_timeout: Duration,
    pub protocol_handshake_timeout: Duration,
    pub ping_interval: Duration,
    pub ping_timeout: Duration,
    pub local_endpoint: Endpoint,
    pub local_services: u64,
    pub local_user_agent: String,
    pub local_start_height: i32,
    pub local_relay: bool,
    pub tls_cert_policy: CertificatePolicy,
}

impl SessionConfig {
    pub fn new(chain: &ChainParams, settings: &NodeSettings, local_endpoint: Endpoint) -> Self {
        SessionConfig {
            magic: chain.magic,
            local_nonce: settings.nonce,
            local_protocol_version: DEFAULT_PROTOCOL_VERSION,
            idle_timeout: Duration::from_secs(settings.idle_timeout_seconds),
            inbound_timeout: Duration::from_secs(settings.inbound_timeout_seconds),
            outbound_timeout: Duration::from_secs(settings.outbound_timeout_seconds),
            protocol_handshake_timeout: Duration::from_secs(
                settings.protocol_handshake_timeout_seconds,
            ),
            ping_interval: Duration::from_secs(settings.ping_interval_seconds),
            ping_timeout: Duration::from_millis(settings.ping_timeout_milliseconds),
            local_endpoint,
            local_services: 0,
            local_user_agent: format!("/znode:{}/", env!("CARGO_PKG_VERSION")),
            local_start_height: 0,
            local_relay: true,
            tls_cert_policy: CertificatePolicy::Insecure,
        }
    }
}

#[derive(Default)]
struct OutboundQueue {
    high: VecDeque<OutboundFrame>,
    normal: VecDeque<OutboundFrame>,
}

impl OutboundQueue {
    fn push(&mut self, frame: OutboundFrame, priority: Priority) {
        match priority {
            Priority::High => self.high.push_back(frame),
            Priority::Normal => self.normal.push_back(frame),
        }
    }

    fn pop(&mut self) -> Option<OutboundFrame> {
        self.high.pop_front().or_else(|| self.normal.pop_front())
    }

    fn is_empty(&self) -> bool {
        self.high.is_empty() && self.normal.is_empty()
    }
}

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> u64 {
    NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed)
}

/// The shared state of a session: owned by an `Arc` held both by the
/// spawned pump task and by the hub's registry entry (`SessionHandle`).
/// The handshake status, ping sample, and outbound queue each have their
/// own lock, held only across the short critical section that reads or
/// mutates them — never across an `.await`.
pub struct PeerSession {
    id: u64,
    connection_type: ConnectionType,
    local_endpoint: Endpoint,
    remote_endpoint: Endpoint,
    config: Arc<SessionConfig>,

    handshake: Mutex<HandshakeStatus>,
    handshake_completed_fired: AtomicBool,
    effective_version: AtomicU32,
    remote_version: Mutex<Option<VersionPayload>>,

    connected_at: Instant,
    last_inbound_activity: Mutex<Instant>,
    last_outbound_activity: Mutex<Instant>,
    inbound_partial_since: Mutex<Option<Instant>>,
    outbound_partial_since: Mutex<Option<Instant>>,

    ping: Mutex<PingMeter>,
    traffic: TrafficMeter,

    outbound: Mutex<OutboundQueue>,
    outbound_notify: Notify,
    stop_notify: Notify,

    getaddr_honored: AtomicBool,
    inbound_counts: Mutex<HashMap<MessageTag, u64>>,
    outbound_counts: Mutex<HashMap<MessageTag, u64>>,

    running: AtomicBool,
}

/// A read-only view of a session's state, handed to the hub's info timer
/// and routing layer without exposing the internals needed to drive it.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub id: u64,
    pub connection_type: ConnectionType,
    pub local_endpoint: Endpoint,
    pub remote_endpoint: Endpoint,
    pub fully_connected: bool,
    pub effective_version: u32,
    pub connection_duration: Duration,
    pub ping_latency: Option<Duration>,
    pub traffic: TrafficSnapshot,
    pub is_running: bool,
}

impl PeerSession {
    pub fn new(
        connection_type: ConnectionType,
        local_endpoint: Endpoint,
        remote_endpoint: Endpoint,
        config: Arc<SessionConfig>,
    ) -> Arc<Self> {
        let now = Instant::now();
        Arc::new(PeerSession {
            id: next_session_id(),
            connection_type,
            local_endpoint,
            remote_endpoint,
            config,
            handshake: Mutex::new(HandshakeStatus::empty()),
            handshake_completed_fired: AtomicBool::new(false),
            effective_version: AtomicU32::new(DEFAULT_PROTOCOL_VERSION),
            remote_version: Mutex::new(None),
            connected_at: now,
            last_inbound_activity: Mutex::new(now),
            last_outbound_activity: Mutex::new(now),
            inbound_partial_since: Mutex::new(None),
            outbound_partial_since: Mutex::new(None),
            ping: Mutex::new(PingMeter::new()),
            traffic: TrafficMeter::new(),
            outbound: Mutex::new(OutboundQueue::default()),
            outbound_notify: Notify::new(),
            stop_notify: Notify::new(),
            getaddr_honored: AtomicBool::new(false),
            inbound_counts: Mutex::new(HashMap::new()),
            outbound_counts: Mutex::new(HashMap::new()),
            running: AtomicBool::new(true),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn connection_type(&self) -> ConnectionType {
        self.connection_type
    }

    pub fn remote_endpoint(&self) -> Endpoint {
        self.remote_endpoint
    }

    pub fn local_endpoint(&self) -> Endpoint {
        self.local_endpoint
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn fully_connected(&self) -> bool {
        self.is_running() && self.handshake.lock().unwrap().is_completed()
    }

    pub fn effective_version(&self) -> u32 {
        self.effective_version.load(Ordering::Acquire)
    }

    pub fn traffic(&self) -> &TrafficMeter {
        &self.traffic
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            connection_type: self.connection_type,
            local_endpoint: self.local_endpoint,
            remote_endpoint: self.remote_endpoint,
            fully_connected: self.fully_connected(),
            effective_version: self.effective_version(),
            connection_duration: self.connected_at.elapsed(),
            ping_latency: self.ping.lock().unwrap().ema_round_trip(),
            traffic: self.traffic.sample(),
            is_running: self.is_running(),
        }
    }

    /// Queues a payload for delivery, encoding it into a frame immediately
    /// so a malformed payload is rejected at call time rather than when
    /// the write pump gets to it.
    pub fn push_payload(&self, payload: &Payload, priority: Priority) -> Result<(), FramingError> {
        let frame = OutboundFrame::for_payload(self.config.magic, payload)?;
        self.enqueue_frame(frame, priority);
        Ok(())
    }

    fn enqueue_frame(&self, frame: OutboundFrame, priority: Priority) {
        self.outbound.lock().unwrap().push(frame, priority);
        self.outbound_notify.notify_one();
    }

    fn outbound_is_empty(&self) -> bool {
        self.outbound.lock().unwrap().is_empty()
    }

    /// Idempotent: the first caller to flip `running` is the one that
    /// performs the notification; later calls are no-ops.
    pub fn request_stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            self.stop_notify.notify_waiters();
            self.outbound_notify.notify_waiters();
        }
    }

    /// Classifies why a session has gone idle, if it has.
    pub fn classify_idleness(&self, now: Instant) -> IdleReason {
        if let Some(duration) = self.ping.lock().unwrap().pending_sample_duration() {
            if duration > self.config.ping_timeout {
                return IdleReason::PingTimeout;
            }
        }
        if !self.handshake.lock().unwrap().is_completed()
            && now.duration_since(self.connected_at) > self.config.protocol_handshake_timeout
        {
            return IdleReason::ProtocolHandshakeTimeout;
        }
        if let Some(started) = *self.inbound_partial_since.lock().unwrap() {
            if now.duration_since(started) > self.config.inbound_timeout {
                return IdleReason::InboundTimeout;
            }
        }
        if let Some(started) = *self.outbound_partial_since.lock().unwrap() {
            if now.duration_since(started) > self.config.outbound_timeout {
                return IdleReason::OutboundTimeout;
            }
        }
        let last_inbound = *self.last_inbound_activity.lock().unwrap();
        let last_outbound = *self.last_outbound_activity.lock().unwrap();
        let last_activity = last_inbound.max(last_outbound);
        if now.duration_since(last_activity) > self.config.idle_timeout {
            return IdleReason::GlobalTimeout;
        }
        IdleReason::NotIdle
    }

    fn mark_inbound_activity(&self) {
        *self.last_inbound_activity.lock().unwrap() = Instant::now();
    }

    fn mark_outbound_activity(&self) {
        *self.last_outbound_activity.lock().unwrap() = Instant::now();
    }

    fn mark_inbound_partial_if_absent(&self) {
        let mut guard = self.inbound_partial_since.lock().unwrap();
        if guard.is_none() {
            *guard = Some(Instant::now());
        }
    }

    fn clear_inbound_partial(&self) {
        *self.inbound_partial_since.lock().unwrap() = None;
    }

    fn mark_outbound_partial(&self) {
        *self.outbound_partial_since.lock().unwrap() = Some(Instant::now());
    }

    fn clear_outbound_partial(&self) {
        *self.outbound_partial_since.lock().unwrap() = None;
    }

    fn record_inbound_count(&self, tag: MessageTag) {
        *self.inbound_counts.lock().unwrap().entry(tag).or_insert(0) += 1;
    }

    fn record_outbound_count(&self, tag: MessageTag) {
        *self.outbound_counts.lock().unwrap().entry(tag).or_insert(0) += 1;
    }

    fn send_local_version(&self) {
        let version = VersionPayload {
            protocol_version: self.config.local_protocol_version as i32,
            services: self.config.local_services,
            timestamp: unix_timestamp_now(),
            recipient: self.remote_endpoint,
            sender: self.config.local_endpoint,
            nonce: self.config.local_nonce,
            user_agent: self.config.local_user_agent.clone(),
            start_height: self.config.local_start_height,
            relay: self.config.local_relay,
        };
        if let Err(err) = self.push_payload(&Payload::Version(version), Priority::High) {
            warn!(session = self.id, error = %err, "failed to encode local version payload");
        }
    }

    /// Fires exactly once: starts the ping scheduler and, for any
    /// non-inbound connection, sends a single unsolicited `getaddr`.
    fn fire_handshake_completed(self: &Arc<Self>) {
        if self.handshake_completed_fired.swap(true, Ordering::AcqRel) {
            return;
        }
        if !matches!(self.connection_type, ConnectionType::Inbound) {
            if let Err(err) = self.push_payload(&Payload::GetAddr(GetAddrPayload), Priority::Normal) {
                warn!(session = self.id, error = %err, "failed to queue getaddr");
            }
        }
        spawn_ping_scheduler(Arc::clone(self));
    }
}

fn unix_timestamp_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn spawn_ping_scheduler(session: Arc<PeerSession>) {
    tokio::spawn(async move {
        loop {
            let interval = ping::next_ping_interval(session.config.ping_interval);
            tokio::select! {
                _ = session.stop_notify.notified() => return,
                _ = tokio::time::sleep(interval) => {}
            }
            if !session.is_running() {
                return;
            }
            let nonce = session.ping.lock().unwrap().start_sample();
            if let Some(nonce) = nonce {
                if let Err(err) =
                    session.push_payload(&Payload::Ping(PingPayload(nonce)), Priority::High)
                {
                    warn!(session = session.id, error = %err, "failed to queue ping");
                }
            }
        }
    });
}

/// Object-safe bound for whatever transport a session ends up running
/// over: a plain `TcpStream` or a TLS stream wrapping one. `Box<dyn
/// Transport>` gets `AsyncRead`/`AsyncWrite` for free from tokio's blanket
/// impls over `Box<T: ?Sized>`.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

pub type BoxedTransport = Box<dyn Transport>;

/// Runs a TLS handshake over `stream` in the role implied by
/// `connection_type` (server for Inbound, client otherwise), or returns the
/// plain stream untouched when `tls` is `None`.
pub async fn establish_transport(
    stream: TcpStream,
    connection_type: ConnectionType,
    remote_ip: std::net::IpAddr,
    tls: Option<TlsRoles>,
) -> Result<BoxedTransport, SessionStopError> {
    let Some(roles) = tls else {
        return Ok(Box::new(stream));
    };
    match connection_type {
        ConnectionType::Inbound => {
            let acceptor = tokio_rustls::TlsAcceptor::from(roles.server);
            let tls_stream = acceptor
                .accept(stream)
                .await
                .map_err(|e| SessionStopError::Tls(e.to_string()))?;
            Ok(Box::new(tls_stream))
        }
        _ => {
            let connector = tokio_rustls::TlsConnector::from(roles.client);
            let server_name = rustls::pki_types::ServerName::IpAddress(remote_ip.into());
            let tls_stream = connector
                .connect(server_name, stream)
                .await
                .map_err(|e| SessionStopError::Tls(e.to_string()))?;
            Ok(Box::new(tls_stream))
        }
    }
}

/// The two rustls configs the hub builds once at startup; cheap to clone
/// (both are `Arc`s) into every session that needs TLS. The remote peer's
/// address is per-connection and passed separately to `establish_transport`.
#[derive(Clone)]
pub struct TlsRoles {
    pub server: Arc<rustls::ServerConfig>,
    pub client: Arc<rustls::ClientConfig>,
}

/// Spawns the two tasks that drive a session end to end: a read pump and a
/// write pump. They share no state but the session's own locked fields and
/// channels, so no two handlers for a given direction ever run
/// concurrently: all inbound-message handling happens serially on the read
/// task, all outbound writes serially on the write task. The two tasks
/// themselves run concurrently with each other.
pub fn spawn(
    session: Arc<PeerSession>,
    stream: TcpStream,
    tls: Option<TlsRoles>,
    hub_tx: mpsc::Sender<HubEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let connection_type = session.connection_type;
        let remote_ip = session.remote_endpoint.address.to_ip();
        let transport = match establish_transport(stream, connection_type, remote_ip, tls).await {
            Ok(t) => t,
            Err(err) => {
                warn!(session = session.id, error = %err, "tls handshake failed");
                let _ = hub_tx.send(HubEvent::Disconnected(session.id)).await;
                return;
            }
        };
        let (reader, writer) = tokio::io::split(transport);

        if !matches!(connection_type, ConnectionType::Inbound) {
            session.send_local_version();
            match handshake::apply_transition(
                *session.handshake.lock().unwrap(),
                Direction::Outbound,
                MessageTag::Version,
            ) {
                Ok((next, action)) => {
                    *session.handshake.lock().unwrap() = next;
                    if matches!(action, HandshakeAction::FireCompleted) {
                        session.fire_handshake_completed();
                    }
                }
                Err(err) => {
                    warn!(session = session.id, error = %err, "could not start outbound handshake");
                    let _ = hub_tx.send(HubEvent::Disconnected(session.id)).await;
                    return;
                }
            }
        }

        let write_session = Arc::clone(&session);
        let write_hub_tx = hub_tx.clone();
        let writer_task = tokio::spawn(run_write_pump(write_session, writer, write_hub_tx));

        run_read_pump(Arc::clone(&session), reader, hub_tx.clone()).await;

        session.request_stop();
        let _ = writer_task.await;
        session.running.store(false, Ordering::Release);
        let _ = hub_tx.send(HubEvent::Disconnected(session.id)).await;
    })
}

async fn run_read_pump<R: AsyncRead + Unpin>(
    session: Arc<PeerSession>,
    mut reader: R,
    hub_tx: mpsc::Sender<HubEvent>,
) {
    use tokio::io::AsyncReadExt;

    let mut parser = IncrementalParser::new(session.config.magic);
    let mut read_buf = vec![0u8; MAX_BYTES_PER_IO];

    loop {
        if !session.is_running() {
            break;
        }
        tokio::select! {
            biased;
            _ = session.stop_notify.notified() => {
                break;
            }
            result = reader.read(&mut read_buf) => {
                match result {
                    Ok(0) => break,
                    Ok(n) => {
                        let _ = hub_tx.send(HubEvent::DataBytes(session.id, TrafficDirection::Inbound, n)).await;
                        session.traffic.add_received(n as u64);
                        session.mark_inbound_partial_if_absent();
                        let version = session.effective_version();
                        let results = parser.feed(&read_buf[..n], version);
                        if parser.is_awaiting_body() {
                            session.mark_inbound_partial_if_absent();
                        } else {
                            session.clear_inbound_partial();
                        }
                        let mut fatal = false;
                        for item in results {
                            match item {
                                Ok(frame) => {
                                    if let Err(stop_err) = handle_inbound_frame(&session, &hub_tx, frame).await {
                                        warn!(session = session.id, error = %stop_err, "session stopping on inbound error");
                                        fatal = true;
                                        break;
                                    }
                                }
                                Err(err) => {
                                    warn!(session = session.id, error = %err, "framing error, stopping session");
                                    fatal = true;
                                    break;
                                }
                            }
                        }
                        if fatal {
                            break;
                        }
                    }
                    Err(err) => {
                        trace!(session = session.id, error = %err, "read error, stopping session");
                        break;
                    }
                }
            }
        }
    }
    session.request_stop();
}

async fn run_write_pump<W: AsyncWrite + Unpin>(
    session: Arc<PeerSession>,
    mut writer: W,
    hub_tx: mpsc::Sender<HubEvent>,
) {
    loop {
        if !session.is_running() {
            break;
        }
        if session.outbound_is_empty() {
            tokio::select! {
                biased;
                _ = session.stop_notify.notified() => break,
                _ = session.outbound_notify.notified() => {}
            }
            continue;
        }
        if drain_outbound(&session, &mut writer).await.is_err() {
            break;
        }
    }
    let _ = writer.shutdown().await;
    let _ = hub_tx.send(HubEvent::DataBytes(session.id, TrafficDirection::Outbound, 0)).await;
}

async fn drain_outbound<W: AsyncWrite + Unpin>(
    session: &Arc<PeerSession>,
    writer: &mut W,
) -> Result<(), ()> {
    loop {
        let next = session.outbound.lock().unwrap().pop();
        let Some(frame) = next else { return Ok(()) };
        let tag = frame.header.tag();

        let transition = handshake::apply_transition(
            *session.handshake.lock().unwrap(),
            Direction::Outbound,
            tag,
        );
        match transition {
            Ok((next_status, action)) => {
                *session.handshake.lock().unwrap() = next_status;
                if matches!(action, HandshakeAction::FireCompleted) {
                    session.fire_handshake_completed();
                }
            }
            Err(err) => {
                warn!(session = session.id, ?tag, error = %err, "outbound message illegal for handshake state");
                session.request_stop();
                return Err(());
            }
        }

        session.mark_outbound_partial();
        let bytes = frame.to_bytes();
        let mut io_failed = false;
        for chunk in bytes.chunks(MAX_BYTES_PER_IO) {
            if let Err(err) = writer.write_all(chunk).await {
                trace!(session = session.id, error = %err, "write error, stopping session");
                io_failed = true;
                break;
            }
        }
        if !io_failed {
            if let Err(err) = writer.flush().await {
                trace!(session = session.id, error = %err, "flush error, stopping session");
                io_failed = true;
            }
        }
        if io_failed {
            session.request_stop();
            return Err(());
        }

        session.clear_outbound_partial();
        if !matches!(tag, MessageTag::Ping | MessageTag::Pong) {
            session.mark_outbound_activity();
        }
        session.traffic.add_sent(bytes.len() as u64);
        session.record_outbound_count(tag);
    }
}

async fn handle_inbound_frame(
    session: &Arc<PeerSession>,
    hub_tx: &mpsc::Sender<HubEvent>,
    frame: crate::message::InboundFrame,
) -> Result<(), SessionStopError> {
    let tag = frame.tag();
    session.record_inbound_count(tag);

    let transition =
        handshake::apply_transition(*session.handshake.lock().unwrap(), Direction::Inbound, tag)?;
    *session.handshake.lock().unwrap() = transition.0;
    if matches!(transition.1, HandshakeAction::FireCompleted) {
        session.fire_handshake_completed();
    }

    if !matches!(tag, MessageTag::Ping | MessageTag::Pong) {
        session.mark_inbound_activity();
    }

    let payload = Payload::decode(tag, &frame.payload)
        .map_err(|e| SessionStopError::Framing(FramingError::Codec(e)))?;

    match payload {
        Payload::Version(version) => {
            if version.nonce == session.config.local_nonce {
                return Err(SessionStopError::Session(SessionError::ConnectedToSelf));
            }
            let remote_version = version.protocol_version as u32;
            if !(MIN_SUPPORTED_PROTOCOL_VERSION..=MAX_SUPPORTED_PROTOCOL_VERSION)
                .contains(&remote_version)
            {
                return Err(SessionStopError::Session(SessionError::InvalidProtocolVersion));
            }
            let effective = session.config.local_protocol_version.min(remote_version);
            session.effective_version.store(effective, Ordering::Release);

            let already_sent = session
                .handshake
                .lock()
                .unwrap()
                .contains(HandshakeStatus::VERSION_SENT);
            *session.remote_version.lock().unwrap() = Some(version);
            if !already_sent {
                session.send_local_version();
            }
            if let Err(err) = session.push_payload(&Payload::VerAck(VerAckPayload), Priority::High) {
                return Err(SessionStopError::Framing(err));
            }
        }
        Payload::VerAck(_) => {}
        Payload::Ping(ping) => {
            if let Err(err) =
                session.push_payload(&Payload::Pong(PongPayload(ping.0)), Priority::High)
            {
                return Err(SessionStopError::Framing(err));
            }
        }
        Payload::Pong(pong) => {
            session
                .ping
                .lock()
                .unwrap()
                .end_sample(pong.0)
                .map_err(SessionStopError::Session)?;
        }
        Payload::GetAddr(_) => {
            if matches!(session.connection_type, ConnectionType::Inbound)
                && session.getaddr_honored.swap(true, Ordering::AcqRel)
            {
                return Ok(());
            }
            let _ = hub_tx
                .send(HubEvent::InboundPayload(session.id, Payload::GetAddr(GetAddrPayload)))
                .await;
        }
        other => {
            let _ = hub_tx.send(HubEvent::InboundPayload(session.id, other)).await;
        }
    }
    Ok(())
}
