//! DNS seed resolution. Queries each configured hostname for A and AAAA
//! records separately — some resolvers short-circuit after a successful A
//! lookup and never attempt AAAA, so treating them as one combined lookup
//! would silently drop every IPv6 seed peer.

use std::net::IpAddr;

use trust_dns_resolver::TokioAsyncResolver;

use crate::address::{Address, Endpoint};
use crate::error::HubError;

/// Resolves one seed hostname to the endpoints it advertises, at the
/// chain's default port. Resolution failures are reported to the caller as
/// an error but are never fatal to seeding as a whole — the caller logs
/// and moves to the next hostname.
pub async fn resolve_seed(
    resolver: &TokioAsyncResolver,
    hostname: &str,
    default_port: u16,
) -> Result<Vec<Endpoint>, HubError> {
    let mut endpoints = Vec::new();
    let mut last_error = None;

    match resolver.ipv4_lookup(hostname).await {
        Ok(response) => {
            endpoints.extend(
                response
                    .iter()
                    .map(|record| IpAddr::V4(record.0))
                    .map(|ip| Endpoint::new(Address::from_ip(ip), default_port)),
            );
        }
        Err(source) => last_error = Some(source),
    }

    // Queried independently of the A lookup above, and its failure alone
    // never discards A records already collected: a missing AAAA record is
    // normal for seeds with no IPv6 glue.
    match resolver.ipv6_lookup(hostname).await {
        Ok(response) => {
            endpoints.extend(
                response
                    .iter()
                    .map(|record| IpAddr::V6(record.0))
                    .map(|ip| Endpoint::new(Address::from_ip(ip), default_port)),
            );
        }
        Err(source) => last_error = Some(source),
    }

    if endpoints.is_empty() {
        if let Some(source) = last_error {
            return Err(HubError::DnsResolution {
                hostname: hostname.to_string(),
                source,
            });
        }
    }

    Ok(endpoints)
}

/// Resolves every configured seed, logging and skipping hostnames that
/// fail outright (both A and AAAA lookups erroring).
pub async fn resolve_all_seeds(seeds: &[String], default_port: u16) -> Vec<Endpoint> {
    let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
        Ok(resolver) => resolver,
        Err(err) => {
            tracing::warn!(error = %err, "failed to build DNS resolver from system configuration");
            return Vec::new();
        }
    };

    let mut endpoints = Vec::new();
    for hostname in seeds {
        match resolve_seed(&resolver, hostname, default_port).await {
            Ok(resolved) => {
                tracing::debug!(hostname, count = resolved.len(), "resolved dns seed");
                endpoints.extend(resolved);
            }
            Err(err) => {
                tracing::warn!(hostname, error = %err, "dns seed resolution failed");
            }
        }
    }
    endpoints
}
