// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Canonical DNS names derived from the operator configuration.
//!
//! Every name the operator publishes or probes is a pure function of the
//! configuration and the Gslb name; nothing here touches the network.

use crate::config::Config;
use crate::constants::LOCAL_TARGETS_PREFIX;

/// NS hostname advertised by this cluster for the delegated zone.
///
/// Shape: `gslb-ns-<dns zone with dots replaced by dashes>-<geo tag>.<edge zone>`.
#[must_use]
pub fn ns_server_name(config: &Config) -> String {
    ns_server_name_for_tag(config, &config.cluster_geo_tag)
}

/// NS hostnames advertised by all peer clusters, in configuration order.
#[must_use]
pub fn ns_server_names_ext(config: &Config) -> Vec<String> {
    config
        .ext_clusters_geo_tags
        .iter()
        .map(|geo_tag| ns_server_name_for_tag(config, geo_tag))
        .collect()
}

/// NS hostname for an arbitrary geo tag.
#[must_use]
pub fn ns_server_name_for_tag(config: &Config, geo_tag: &str) -> String {
    let dns_zone_into_ns = config.dns_zone.replace('.', "-");
    format!(
        "gslb-ns-{}-{}.{}",
        dns_zone_into_ns, geo_tag, config.edge_dns_zone
    )
}

/// Heartbeat TXT record name for a given cluster.
#[must_use]
pub fn heartbeat_fqdn(gslb_name: &str, geo_tag: &str, config: &Config) -> String {
    format!("{}-heartbeat-{}.{}", gslb_name, geo_tag, config.edge_dns_zone)
}

/// Heartbeat TXT record names of all peer clusters.
#[must_use]
pub fn external_heartbeat_fqdns(gslb_name: &str, config: &Config) -> Vec<String> {
    config
        .ext_clusters_geo_tags
        .iter()
        .map(|geo_tag| heartbeat_fqdn(gslb_name, geo_tag, config))
        .collect()
}

/// Name of the per-cluster A record carrying only local targets.
#[must_use]
pub fn local_targets_fqdn(host: &str) -> String {
    format!("{LOCAL_TARGETS_PREFIX}-{host}")
}

/// True when `host` is the edge DNS zone or one of its subdomains.
#[must_use]
pub fn host_under_zone(host: &str, zone: &str) -> bool {
    host == zone || host.ends_with(&format!(".{zone}"))
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod names_tests;
