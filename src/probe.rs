// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Edge DNS probe: stateless A and TXT lookups against a configured resolver.
//!
//! Queries go over UDP with `hickory-client`'s synchronous client, wrapped in
//! `tokio::task::spawn_blocking` so the reconcile future stays cancellable.
//! Address lists come back lexicographically sorted and deduplicated so
//! downstream spec diffs are stable.

use crate::constants::{DNS_PORT, FAKE_DNS_ADDRESS, PEER_PROBE_TIMEOUT_SECS};
use crate::errors::ProbeError;
use hickory_client::client::{Client, SyncClient};
use hickory_client::rr::{DNSClass, Name, RData, RecordType};
use hickory_client::udp::UdpClientConnection;
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;
use std::time::Duration;

/// Resolver address for edge and peer queries.
///
/// When the fake DNS flag is on the loopback test resolver is used verbatim;
/// otherwise the standard DNS port is appended to the configured server host.
#[must_use]
pub fn resolver_address(fake_dns_enabled: bool, server: &str) -> String {
    if fake_dns_enabled {
        FAKE_DNS_ADDRESS.to_string()
    } else {
        format!("{server}:{DNS_PORT}")
    }
}

/// Resolve `fqdn` to its IPv4 addresses at `server` (a `host:port` address).
///
/// Returns a lexicographically sorted, deduplicated list of dotted-quad
/// strings. String sort rather than numeric keeps the ordering identical to
/// what the published endpoint specs carry.
///
/// # Errors
///
/// - [`ProbeError::EmptyServer`] when `server` is empty
/// - [`ProbeError::QueryFailed`] when the exchange fails
pub async fn resolve_a(server: &str, fqdn: &str) -> Result<Vec<String>, ProbeError> {
    let answers = exchange(server, fqdn, RecordType::A).await?;

    let mut ips: Vec<String> = answers
        .into_iter()
        .filter_map(|rdata| {
            if let RData::A(ipv4) = rdata {
                Some(ipv4.to_string())
            } else {
                None
            }
        })
        .collect();
    ips.sort();
    ips.dedup();
    Ok(ips)
}

/// Query the TXT record at `fqdn` and return the character strings of the
/// first answer. An empty answer section is not an error; it yields an
/// empty list.
///
/// # Errors
///
/// - [`ProbeError::EmptyServer`] when `server` is empty
/// - [`ProbeError::QueryFailed`] when the exchange fails
pub async fn query_txt(server: &str, fqdn: &str) -> Result<Vec<String>, ProbeError> {
    let answers = exchange(server, fqdn, RecordType::TXT).await?;

    for rdata in answers {
        if let RData::TXT(txt) = rdata {
            return Ok(txt
                .txt_data()
                .iter()
                .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                .collect());
        }
    }
    Ok(Vec::new())
}

/// Perform a single UDP exchange and return the answer rdata of the matching type.
async fn exchange(
    server: &str,
    fqdn: &str,
    record_type: RecordType,
) -> Result<Vec<RData>, ProbeError> {
    if server.is_empty() {
        return Err(ProbeError::EmptyServer);
    }

    let server_str = server.to_string();
    let fqdn_str = fqdn.to_string();

    tokio::task::spawn_blocking(move || {
        let server_addr = lookup_server(&server_str, &fqdn_str)?;

        let conn = UdpClientConnection::with_timeout(
            server_addr,
            Duration::from_secs(PEER_PROBE_TIMEOUT_SECS),
        )
        .map_err(|e| query_failed(&server_str, &fqdn_str, &e.to_string()))?;
        let client = SyncClient::new(conn);

        let name = Name::from_str(&fqdn_str)
            .map_err(|e| query_failed(&server_str, &fqdn_str, &e.to_string()))?;

        let response = client
            .query(&name, DNSClass::IN, record_type)
            .map_err(|e| query_failed(&server_str, &fqdn_str, &e.to_string()))?;

        Ok(response
            .answers()
            .iter()
            .filter(|record| record.record_type() == record_type)
            .filter_map(|record| record.data().cloned())
            .collect())
    })
    .await
    .map_err(|e| query_failed(server, fqdn, &e.to_string()))?
}

/// Resolve a `host:port` resolver address. Peer NS servers are referenced by
/// hostname, so this may itself require a system lookup.
fn lookup_server(server: &str, fqdn: &str) -> Result<SocketAddr, ProbeError> {
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Ok(addr);
    }
    server
        .to_socket_addrs()
        .map_err(|e| query_failed(server, fqdn, &e.to_string()))?
        .next()
        .ok_or_else(|| query_failed(server, fqdn, "resolver address resolved to nothing"))
}

fn query_failed(server: &str, fqdn: &str, reason: &str) -> ProbeError {
    ProbeError::QueryFailed {
        server: server.to_string(),
        fqdn: fqdn.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod probe_tests;
