use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, info, warn};

use znode_net::config::{ChainParams, NodeSettings};
use znode_net::hub::{ConnectionHub, RoutedMessage};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Which network's magic bytes, default port, and DNS seeds to use.
    #[arg(long, default_value = "testnet")]
    chain: String,

    /// Path to a TOML file with `NodeSettings` fields; anything it omits
    /// keeps its built-in default.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides `local_endpoint` from the config file, e.g. `0.0.0.0:8233`.
    #[arg(long)]
    listen: Option<String>,

    /// Directory holding `cert.pem`/`key.pem` for TLS. Required if the
    /// config enables `use_tls` and self-signed generation isn't allowed.
    #[arg(long)]
    tls_cert_dir: Option<PathBuf>,

    /// Permits generating a self-signed certificate when `use_tls` is set
    /// and no material is found at `tls_cert_dir`.
    #[arg(long, default_value_t = false)]
    generate_self_signed: bool,
}

fn load_settings(args: &Args) -> anyhow::Result<NodeSettings> {
    let mut settings = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            toml::from_str(&raw)?
        }
        None => NodeSettings::default(),
    };
    if let Some(listen) = &args.listen {
        settings.local_endpoint = listen.clone();
    }
    Ok(settings)
}

fn load_chain(name: &str) -> anyhow::Result<ChainParams> {
    match name {
        "mainnet" => Ok(ChainParams::mainnet()),
        "testnet" => Ok(ChainParams::testnet()),
        other => anyhow::bail!("unknown chain {other:?}, expected \"mainnet\" or \"testnet\""),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let chain = load_chain(&args.chain)?;
    let settings = load_settings(&args)?;

    let (hub, mut routed_rx) = ConnectionHub::new(
        chain,
        settings,
        args.tls_cert_dir.as_deref(),
        args.generate_self_signed,
    )?;
    hub.start()?;
    info!(local = %hub.local_endpoint(), "znoded started");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
            routed = routed_rx.recv() => {
                match routed {
                    Some(message) => log_routed_message(&message),
                    None => {
                        warn!("routed message channel closed unexpectedly");
                        break;
                    }
                }
            }
        }
    }

    hub.stop().await;
    Ok(())
}

fn log_routed_message(message: &RoutedMessage) {
    match message {
        RoutedMessage::Addr { session, entries } => {
            debug!(session, count = entries.len(), "received addr");
        }
        RoutedMessage::GetHeaders { session, .. } => debug!(session, "received getheaders"),
        RoutedMessage::Inv { session, payload } => {
            debug!(session, count = payload.0.len(), "received inv")
        }
        RoutedMessage::GetData { session, payload } => {
            debug!(session, count = payload.0.len(), "received getdata")
        }
        RoutedMessage::NotFound { session, payload } => {
            debug!(session, count = payload.0.len(), "received notfound")
        }
        RoutedMessage::Headers { session, .. } => debug!(session, "received headers"),
        RoutedMessage::Reject { session, payload } => {
            debug!(session, reason = %payload.reason, "received reject")
        }
        RoutedMessage::MemPool { session } => debug!(session, "received mempool"),
        RoutedMessage::GetAddr { session } => debug!(session, "received getaddr"),
    }
}
