// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Imperative zone publisher for the Infoblox edge DNS.
//!
//! Unlike the declarative family this provider mutates the delegated zone
//! directly through the grid API, and maintains the per-cluster heartbeat
//! TXT record that peers use to detect split brain. Within one reconcile the
//! delegation update always happens before the heartbeat refresh, so a peer
//! that observes a fresh heartbeat can rely on the local NS entries being
//! installed.

use crate::assistant::GslbAssistant;
use crate::config::Config;
use crate::constants::{HEARTBEAT_TIMESTAMP_FORMAT, INFOBLOX_DNS_VIEW};
use crate::crd::Gslb;
use crate::errors::PublishError;
use crate::names::{heartbeat_fqdn, ns_server_name, ns_server_name_for_tag};
use crate::probe;
use crate::providers::wapi::{DelegationApi, NameServer};
use crate::providers::DnsProvider;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeDelta, Utc};
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{info, warn};

/// Infoblox-backed zone publisher.
pub struct Infoblox {
    config: Arc<Config>,
    assistant: GslbAssistant,
    api: Box<dyn DelegationApi>,
}

impl Infoblox {
    /// Create a publisher using the given delegation API implementation.
    #[must_use]
    pub fn new(config: Arc<Config>, assistant: GslbAssistant, api: Box<dyn DelegationApi>) -> Self {
        Self {
            config,
            assistant,
            api,
        }
    }

    /// Delegate-to entries advertising this cluster's NS under its current
    /// exposed addresses.
    async fn local_ns_entries(&self, gslb: &Gslb) -> Result<Vec<NameServer>> {
        let addresses = self.assistant.gslb_ingress_exposed_ips(gslb).await?;
        let ns_name = ns_server_name(&self.config);
        Ok(addresses
            .into_iter()
            .map(|address| NameServer {
                address,
                name: ns_name.clone(),
            })
            .collect())
    }

    /// NS hostnames of peers whose heartbeat no longer proves them alive.
    async fn dead_peer_ns_names(&self, gslb: &Gslb) -> Vec<String> {
        let threshold = gslb.spec.strategy.split_brain_threshold_seconds;
        let resolver = probe::resolver_address(
            self.config.overrides.fake_dns_enabled,
            &self.config.edge_dns_server,
        );

        let mut dead = Vec::new();
        for geo_tag in &self.config.ext_clusters_geo_tags {
            let heartbeat = heartbeat_fqdn(&gslb.name_any(), geo_tag, &self.config);
            // Trailing dot makes the query name a true FQDN.
            let alive = match probe::query_txt(&resolver, &format!("{heartbeat}.")).await {
                Ok(texts) => heartbeat_is_alive(&texts, Utc::now().naive_utc(), threshold),
                Err(err) => {
                    warn!(
                        "Error contacting edge DNS for heartbeat TXT {}: {}",
                        heartbeat, err
                    );
                    false
                }
            };
            if !alive {
                let peer_ns = ns_server_name_for_tag(&self.config, geo_tag);
                info!(
                    "External cluster ({}) doesn't look alive, filtering {} out of the delegated zone",
                    heartbeat, peer_ns
                );
                dead.push(peer_ns);
            }
        }
        dead
    }
}

#[async_trait]
impl DnsProvider for Infoblox {
    async fn publish_zone_delegation(&self, gslb: &Gslb) -> Result<()> {
        let local_entries = self.local_ns_entries(gslb).await?;
        let dead_peers = self.dead_peer_ns_names(gslb).await;

        configure_delegated_zone(
            self.api.as_ref(),
            &self.config.dns_zone,
            &ns_server_name(&self.config),
            local_entries,
            &dead_peers,
        )
        .await?;

        // Heartbeat refresh comes strictly after the delegation update.
        let heartbeat_name =
            heartbeat_fqdn(&gslb.name_any(), &self.config.cluster_geo_tag, &self.config);
        refresh_heartbeat(
            self.api.as_ref(),
            &heartbeat_name,
            &heartbeat_timestamp(Utc::now().naive_utc()),
            gslb.spec.strategy.dns_ttl_seconds,
        )
        .await?;
        Ok(())
    }

    async fn finalize(&self, gslb: &Gslb) -> Result<()> {
        let heartbeat_name =
            heartbeat_fqdn(&gslb.name_any(), &self.config.cluster_geo_tag, &self.config);
        finalize_delegated_zone(self.api.as_ref(), &self.config.dns_zone, &heartbeat_name).await?;
        Ok(())
    }
}

/// Install or refresh this cluster's entries in the delegated zone.
///
/// A missing zone is created with just the local entries. An existing zone
/// goes through merge and prune: the local cluster's stale entries are
/// replaced by `local_entries`, and every entry belonging to a dead peer is
/// dropped. Running this twice with unchanged inputs yields the same
/// delegate-to set.
///
/// # Errors
///
/// [`PublishError::MisdelegatedZone`] when the provider returns a zone whose
/// FQDN differs from the requested one; provider failures otherwise.
pub async fn configure_delegated_zone(
    api: &dyn DelegationApi,
    dns_zone: &str,
    local_ns_name: &str,
    local_entries: Vec<NameServer>,
    dead_peer_ns_names: &[String],
) -> Result<(), PublishError> {
    match api.get_zone_delegated(dns_zone).await? {
        None => {
            info!("Creating delegated zone {}", dns_zone);
            api.create_zone_delegated(dns_zone, &local_entries).await
        }
        Some(zone) => {
            if zone.fqdn != dns_zone {
                return Err(PublishError::MisdelegatedZone {
                    found: zone.fqdn,
                    requested: dns_zone.to_string(),
                });
            }
            if zone.zone_ref.is_empty() {
                return Ok(());
            }

            // Drop our own stale entries, then append the fresh ones.
            let mut delegate_to = filter_out_delegate_to(zone.delegate_to, local_ns_name);
            delegate_to.extend(local_entries);

            for peer_ns in dead_peer_ns_names {
                delegate_to = filter_out_delegate_to(delegate_to, peer_ns);
            }

            info!(
                "Updating delegated zone {} with server list {:?}",
                dns_zone, delegate_to
            );
            api.update_zone_delegated(&zone.zone_ref, &delegate_to).await
        }
    }
}

/// Create the heartbeat TXT record or update its payload in place.
///
/// # Errors
///
/// Provider failures.
pub async fn refresh_heartbeat(
    api: &dyn DelegationApi,
    name: &str,
    timestamp: &str,
    ttl: i64,
) -> Result<(), PublishError> {
    match api.get_txt_record(name).await? {
        None => {
            info!("Creating heartbeat TXT record {}", name);
            api.create_txt_record(name, timestamp, ttl, INFOBLOX_DNS_VIEW)
                .await
        }
        Some(record) => {
            info!("Updating heartbeat TXT record {}", name);
            api.update_txt_record(&record.record_ref, timestamp).await
        }
    }
}

/// Remove this cluster's delegated zone and heartbeat. Peer heartbeats are
/// never touched.
///
/// # Errors
///
/// [`PublishError::MisdelegatedZone`] on a zone FQDN mismatch; provider
/// failures otherwise.
pub async fn finalize_delegated_zone(
    api: &dyn DelegationApi,
    dns_zone: &str,
    heartbeat_name: &str,
) -> Result<(), PublishError> {
    if let Some(zone) = api.get_zone_delegated(dns_zone).await? {
        if zone.fqdn != dns_zone {
            return Err(PublishError::MisdelegatedZone {
                found: zone.fqdn,
                requested: dns_zone.to_string(),
            });
        }
        if !zone.zone_ref.is_empty() {
            info!("Deleting delegated zone {}", dns_zone);
            api.delete_zone_delegated(&zone.zone_ref).await?;
        }
    }

    if let Some(record) = api.get_txt_record(heartbeat_name).await? {
        if !record.record_ref.is_empty() {
            info!("Deleting heartbeat TXT record {}", heartbeat_name);
            api.delete_txt_record(&record.record_ref).await?;
        }
    }
    Ok(())
}

/// Remove every delegate-to entry whose name equals `fqdn`.
#[must_use]
pub fn filter_out_delegate_to(delegate_to: Vec<NameServer>, fqdn: &str) -> Vec<NameServer> {
    delegate_to
        .into_iter()
        .filter(|entry| entry.name != fqdn)
        .collect()
}

/// Format `now` the way heartbeat TXT records carry it.
#[must_use]
pub fn heartbeat_timestamp(now: NaiveDateTime) -> String {
    now.format(HEARTBEAT_TIMESTAMP_FORMAT).to_string()
}

/// Decide whether a heartbeat TXT payload proves the peer alive at `now`.
///
/// The first answer string is taken as the timestamp, surrounding quotes
/// stripped. Anything unparseable counts as dead, never as an error.
#[must_use]
pub fn heartbeat_is_alive(texts: &[String], now: NaiveDateTime, threshold_seconds: i64) -> bool {
    let Some(raw) = texts.first() else {
        return false;
    };
    let timestamp = raw.trim_matches('"');
    let Ok(parsed) = NaiveDateTime::parse_from_str(timestamp, HEARTBEAT_TIMESTAMP_FORMAT) else {
        info!("Unparseable heartbeat timestamp {:?}", raw);
        return false;
    };
    now - parsed <= TimeDelta::seconds(threshold_seconds)
}

#[cfg(test)]
#[path = "infoblox_tests.rs"]
mod infoblox_tests;
