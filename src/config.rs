// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Operator configuration resolved once at startup.
//!
//! Every option is read from the environment by [`Config::from_env`] and the
//! resulting struct is shared read-only across reconciles. Nothing in the
//! reconcile path reads the environment directly.

use crate::constants::{
    DEFAULT_INFOBLOX_WAPI_PORT, DEFAULT_RECONCILE_REQUEUE_SECS,
};
use anyhow::{bail, Context, Result};
use std::env;
use std::fmt;

/// Edge DNS backend family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeDnsType {
    /// No edge DNS integration; only the per-Gslb host endpoint is published.
    #[default]
    NoEdgeDns,
    /// Imperative zone-delegation management through the Infoblox WAPI.
    Infoblox,
    /// Declarative delegation through a `DNSEndpoint` consumed by external-dns (Route53).
    Route53,
    /// Declarative delegation through a `DNSEndpoint` consumed by external-dns (NS1).
    Ns1,
}

impl fmt::Display for EdgeDnsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEdgeDns => write!(f, "none"),
            Self::Infoblox => write!(f, "infoblox"),
            Self::Route53 => write!(f, "route53"),
            Self::Ns1 => write!(f, "ns1"),
        }
    }
}

/// Infoblox WAPI credentials and connection parameters.
#[derive(Clone, Debug, Default)]
pub struct InfobloxConfig {
    /// Grid manager hostname.
    pub grid_host: String,
    /// WAPI version, e.g. `2.3.1`.
    pub wapi_version: String,
    /// WAPI port.
    pub wapi_port: u16,
    /// WAPI username.
    pub wapi_username: String,
    /// WAPI password.
    pub wapi_password: String,
}

/// Test-only transport overrides.
#[derive(Clone, Copy, Debug, Default)]
pub struct Overrides {
    /// Route all edge/peer DNS queries to the loopback fake resolver.
    pub fake_dns_enabled: bool,
    /// Replace the Infoblox WAPI with an in-memory delegation store.
    pub fake_infoblox_enabled: bool,
}

/// Process-wide operator configuration, effectively constant after startup.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Geo tag unique to this cluster, e.g. `eu`.
    pub cluster_geo_tag: String,
    /// Geo tags of all peer clusters.
    pub ext_clusters_geo_tags: Vec<String>,
    /// Zone delegated to the clusters, e.g. `cloud.example.com`.
    pub dns_zone: String,
    /// Parent zone where the delegation is installed, e.g. `example.com`.
    pub edge_dns_zone: String,
    /// Resolver host used for edge and glue lookups.
    pub edge_dns_server: String,
    /// Edge DNS backend family.
    pub edge_dns_type: EdgeDnsType,
    /// When set, the NS A record targets come from the exposed CoreDNS
    /// service instead of the Gslb ingress.
    pub coredns_exposed: bool,
    /// Namespace holding operator-owned objects (`POD_NAMESPACE`).
    pub k8gb_namespace: String,
    /// Steady-state requeue cadence in seconds.
    pub reconcile_requeue_seconds: u64,
    /// Infoblox connection parameters; only read when `edge_dns_type` is Infoblox.
    pub infoblox: InfobloxConfig,
    /// Test-only transport overrides.
    pub overrides: Overrides,
}

impl Config {
    /// Resolve the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails when a required variable is missing or a value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let edge_dns_type = match env_or("EDGE_DNS_TYPE", "none").to_lowercase().as_str() {
            "none" => EdgeDnsType::NoEdgeDns,
            "infoblox" => EdgeDnsType::Infoblox,
            "route53" => EdgeDnsType::Route53,
            "ns1" => EdgeDnsType::Ns1,
            other => bail!("unhandled EDGE_DNS_TYPE: {other}"),
        };

        let config = Self {
            cluster_geo_tag: env_or("CLUSTER_GEO_TAG", ""),
            ext_clusters_geo_tags: parse_geo_tags(&env_or("EXT_GSLB_CLUSTERS_GEO_TAGS", "")),
            dns_zone: required_env("DNS_ZONE")?,
            edge_dns_zone: required_env("EDGE_DNS_ZONE")?,
            edge_dns_server: required_env("EDGE_DNS_SERVER")?,
            edge_dns_type,
            coredns_exposed: parse_bool(&env_or("COREDNS_EXPOSED", "false")),
            k8gb_namespace: required_env("POD_NAMESPACE")?,
            reconcile_requeue_seconds: env_or(
                "RECONCILE_REQUEUE_SECONDS",
                &DEFAULT_RECONCILE_REQUEUE_SECS.to_string(),
            )
            .parse::<u64>()
            .context("RECONCILE_REQUEUE_SECONDS is not a number")?,
            infoblox: InfobloxConfig {
                grid_host: env_or("INFOBLOX_GRID_HOST", ""),
                wapi_version: env_or("INFOBLOX_WAPI_VERSION", ""),
                wapi_port: env_or("INFOBLOX_WAPI_PORT", &DEFAULT_INFOBLOX_WAPI_PORT.to_string())
                    .parse::<u16>()
                    .context("INFOBLOX_WAPI_PORT is not a port number")?,
                wapi_username: env_or("INFOBLOX_WAPI_USERNAME", ""),
                wapi_password: env_or("INFOBLOX_WAPI_PASSWORD", ""),
            },
            overrides: Overrides {
                fake_dns_enabled: parse_bool(&env_or("FAKE_DNS_ENABLED", "false")),
                fake_infoblox_enabled: parse_bool(&env_or("FAKE_INFOBLOX_ENABLED", "false")),
            },
        };

        if config.cluster_geo_tag.is_empty() {
            tracing::warn!("CLUSTER_GEO_TAG is empty; NS hostnames will carry an empty geo tag");
        }

        Ok(config)
    }
}

fn required_env(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("required environment variable {key} is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a comma separated geo tag list, dropping empty segments.
fn parse_geo_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
