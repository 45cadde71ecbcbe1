// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Strategy resolver: computes the target set published for each advertised
//! hostname.
//!
//! For every host the resolver combines three inputs: local service health
//! (from the health oracle), the local cluster's exposed IPs, and the
//! `localtargets-` records served by peer clusters. The configured strategy
//! then decides which of those survive into the published host record.
//!
//! Peer clusters are queried through the [`PeerProber`] trait so tests can
//! substitute an in-memory implementation for the real edge DNS fanout.

use crate::config::Config;
use crate::crd::{DNSEndpoint, DNSEndpointSpec, Endpoint, Gslb, HealthStatus, Strategy, StrategyType};
use crate::constants::{ANNOTATION_DNS_TYPE, DNS_TYPE_LOCAL};
use crate::errors::{GslbError, ResolveError};
use crate::names::{host_under_zone, local_targets_fqdn};
use crate::probe;
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Source of peer clusters' `localtargets-` records.
#[async_trait]
pub trait PeerProber: Send + Sync {
    /// Union of the `localtargets-<host>` addresses served by all peer
    /// clusters. Per-peer failures are tolerated: an unreachable peer
    /// contributes nothing and the probe continues.
    async fn external_targets(&self, host: &str) -> Vec<String>;
}

/// Production prober: one A query per peer, directed at that peer's NS hostname.
pub struct EdgeDnsProber {
    peer_ns_names: Vec<String>,
    fake_dns_enabled: bool,
}

impl EdgeDnsProber {
    /// Create a prober for the given peer NS hostnames.
    #[must_use]
    pub fn new(peer_ns_names: Vec<String>, fake_dns_enabled: bool) -> Self {
        Self {
            peer_ns_names,
            fake_dns_enabled,
        }
    }
}

#[async_trait]
impl PeerProber for EdgeDnsProber {
    async fn external_targets(&self, host: &str) -> Vec<String> {
        let mut targets = Vec::new();
        // Trailing dot makes the query name a true FQDN.
        let probe_name = format!("{}.", local_targets_fqdn(host));

        for peer in &self.peer_ns_names {
            info!("Adding external gslb targets from {} cluster", peer);
            let resolver = probe::resolver_address(self.fake_dns_enabled, peer);
            match probe::resolve_a(&resolver, &probe_name).await {
                Ok(cluster_targets) => {
                    if !cluster_targets.is_empty() {
                        info!(
                            "Added external {:?} gslb targets from {} cluster",
                            cluster_targets, peer
                        );
                        targets.extend(cluster_targets);
                    }
                }
                Err(err) => {
                    warn!("Error contacting external gslb cluster ({}): {}", peer, err);
                }
            }
        }
        targets
    }
}

/// Final target set for one host under the configured strategy.
///
/// Round-robin publishes the union of local (when healthy) and external
/// targets. Failover publishes only the primary's targets while the primary
/// is healthy; a secondary always publishes the external set, so an empty
/// external set suppresses the host record rather than falling back to the
/// secondary's own targets.
#[must_use]
pub fn final_targets(
    strategy: &Strategy,
    health: HealthStatus,
    cluster_geo_tag: &str,
    local_targets: &[String],
    external_targets: &[String],
) -> Vec<String> {
    let healthy = health == HealthStatus::Healthy;
    let is_primary = strategy.primary_geo_tag.as_deref() == Some(cluster_geo_tag);

    let mut targets: Vec<String> = match strategy.r#type {
        StrategyType::RoundRobin => {
            let mut combined = Vec::new();
            if healthy {
                combined.extend_from_slice(local_targets);
            }
            combined.extend_from_slice(external_targets);
            combined
        }
        StrategyType::Failover => {
            if is_primary && healthy {
                local_targets.to_vec()
            } else {
                external_targets.to_vec()
            }
        }
    };

    targets.sort();
    targets.dedup();
    targets
}

/// Build the host-record `DNSEndpoint` for a Gslb.
///
/// Hosts are processed in lexicographic order (the health map is a
/// `BTreeMap`), which keeps the produced spec byte-identical across
/// reconciles with unchanged inputs.
///
/// # Errors
///
/// [`ResolveError::MisconfiguredHost`] when a host is not a subdomain of the
/// edge DNS zone.
pub async fn gslb_endpoint(
    gslb: &Gslb,
    config: &Config,
    service_health: &BTreeMap<String, HealthStatus>,
    local_targets: &[String],
    prober: &dyn PeerProber,
) -> Result<DNSEndpoint, GslbError> {
    let ttl = gslb.spec.strategy.dns_ttl_seconds;
    let mut records = Vec::new();

    for (host, health) in service_health {
        if !host_under_zone(host, &config.edge_dns_zone) {
            return Err(ResolveError::MisconfiguredHost {
                host: host.clone(),
                edge_dns_zone: config.edge_dns_zone.clone(),
            }
            .into());
        }

        if *health == HealthStatus::Healthy {
            let mut sorted_local = local_targets.to_vec();
            sorted_local.sort();
            sorted_local.dedup();
            records.push(Endpoint {
                dns_name: local_targets_fqdn(host),
                record_ttl: ttl,
                record_type: "A".to_string(),
                targets: sorted_local,
            });
        }

        let external_targets = prober.external_targets(host).await;
        if external_targets.is_empty() {
            info!("No external targets have been found for host {}", host);
        }

        let targets = final_targets(
            &gslb.spec.strategy,
            *health,
            &config.cluster_geo_tag,
            local_targets,
            &external_targets,
        );
        info!("Final target list for host {}: {:?}", host, targets);

        if !targets.is_empty() {
            records.push(Endpoint {
                dns_name: host.clone(),
                record_ttl: ttl,
                record_type: "A".to_string(),
                targets,
            });
        }
    }

    let owner_ref = gslb.controller_owner_ref(&());
    Ok(DNSEndpoint {
        metadata: ObjectMeta {
            name: Some(gslb.name_any()),
            namespace: gslb.namespace(),
            annotations: Some(
                [(ANNOTATION_DNS_TYPE.to_string(), DNS_TYPE_LOCAL.to_string())]
                    .into_iter()
                    .collect(),
            ),
            owner_references: owner_ref.map(|r| vec![r]),
            ..ObjectMeta::default()
        },
        spec: DNSEndpointSpec { endpoints: records },
    })
}

#[cfg(test)]
#[path = "strategy_tests.rs"]
mod strategy_tests;
