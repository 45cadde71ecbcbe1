// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for global server load balancing.
//!
//! This module defines the two resource types the operator works with:
//!
//! - [`Gslb`] - the input object: advertised hostnames bound to backing
//!   services plus the steering [`Strategy`]
//! - [`DNSEndpoint`] - the output object: an external-dns compatible set of
//!   DNS records handed to the edge DNS integration
//!
//! # Example: Round-robin Gslb
//!
//! ```yaml
//! apiVersion: k8gb.absa.oss/v1beta1
//! kind: Gslb
//! metadata:
//!   name: app
//!   namespace: test-gslb
//! spec:
//!   hosts:
//!     - host: app.cloud.example.com
//!       service: app-frontend
//!   strategy:
//!     type: roundRobin
//!     dnsTtlSeconds: 30
//!     splitBrainThresholdSeconds: 300
//! ```
//!
//! # Example: Active/passive failover
//!
//! ```yaml
//! apiVersion: k8gb.absa.oss/v1beta1
//! kind: Gslb
//! metadata:
//!   name: payments
//! spec:
//!   hosts:
//!     - host: payments.cloud.example.com
//!       service: payments-api
//!   strategy:
//!     type: failover
//!     primaryGeoTag: eu
//! ```

use crate::constants::{DEFAULT_DNS_TTL_SECS, DEFAULT_SPLIT_BRAIN_THRESHOLD_SECS};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Steering strategy applied when computing the target set for an advertised host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum StrategyType {
    /// Publish the union of healthy targets across all clusters.
    #[default]
    RoundRobin,
    /// Publish only the primary cluster's targets while it is healthy;
    /// fail over to the remaining clusters when it is not.
    Failover,
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundRobin => write!(f, "roundRobin"),
            Self::Failover => write!(f, "failover"),
        }
    }
}

/// Load-balancing strategy for a Gslb.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    /// Strategy type: round-robin or active/passive failover.
    #[serde(default)]
    pub r#type: StrategyType,

    /// Geo tag of the primary cluster. Only meaningful for the failover strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_geo_tag: Option<String>,

    /// TTL in seconds applied to every record this Gslb publishes.
    #[serde(default = "default_dns_ttl_seconds")]
    #[schemars(range(min = 1, max = 2_147_483_647))]
    pub dns_ttl_seconds: i64,

    /// Maximum age in seconds of a peer heartbeat before that peer is
    /// considered dead and pruned from the zone delegation.
    #[serde(default = "default_split_brain_threshold_seconds")]
    #[schemars(range(min = 1, max = 2_147_483_647))]
    pub split_brain_threshold_seconds: i64,
}

impl Default for Strategy {
    fn default() -> Self {
        Self {
            r#type: StrategyType::default(),
            primary_geo_tag: None,
            dns_ttl_seconds: DEFAULT_DNS_TTL_SECS,
            split_brain_threshold_seconds: DEFAULT_SPLIT_BRAIN_THRESHOLD_SECS,
        }
    }
}

fn default_dns_ttl_seconds() -> i64 {
    DEFAULT_DNS_TTL_SECS
}

fn default_split_brain_threshold_seconds() -> i64 {
    DEFAULT_SPLIT_BRAIN_THRESHOLD_SECS
}

/// A single advertised hostname bound to a backing service.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GslbHost {
    /// Externally advertised fully qualified hostname.
    ///
    /// Must be a subdomain of the configured edge DNS zone,
    /// e.g. `app.cloud.example.com`.
    #[schemars(regex(
        pattern = r"^([a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$"
    ))]
    pub host: String,

    /// Name of the backing Service in the Gslb's namespace whose readiness
    /// drives the health of this host.
    pub service: String,
}

/// Health of a backing service as observed by the health oracle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum HealthStatus {
    /// At least one ready endpoint address exists.
    Healthy,
    /// The service exists but has no ready endpoint addresses.
    Unhealthy,
    /// The backing service was not found.
    Unknown,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "Healthy"),
            Self::Unhealthy => write!(f, "Unhealthy"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// `Gslb` status subresource.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GslbStatus {
    /// Health of each advertised host, keyed by hostname.
    #[serde(default)]
    pub service_health: BTreeMap<String, HealthStatus>,
}

/// `Gslb` steers client traffic across clusters at the DNS layer.
///
/// Each Gslb advertises one or more hostnames and keeps the edge DNS
/// delegation and host records in sync with the health of the backing
/// services, locally and on every peer cluster.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8gb.absa.oss",
    version = "v1beta1",
    kind = "Gslb",
    namespaced,
    shortname = "gslb",
    doc = "Gslb defines hostnames load-balanced across clusters and the strategy used to steer traffic between them.",
    printcolumn = r#"{"name":"Strategy","type":"string","jsonPath":".spec.strategy.type"}"#,
    printcolumn = r#"{"name":"PrimaryGeoTag","type":"string","jsonPath":".spec.strategy.primaryGeoTag"}"#,
    printcolumn = r#"{"name":"TTL","type":"integer","jsonPath":".spec.strategy.dnsTtlSeconds"}"#
)]
#[kube(status = "GslbStatus")]
#[serde(rename_all = "camelCase")]
pub struct GslbSpec {
    /// Advertised hostnames with their backing services.
    pub hosts: Vec<GslbHost>,

    /// Load-balancing strategy.
    #[serde(default)]
    pub strategy: Strategy,
}

/// A single DNS record inside a [`DNSEndpoint`].
///
/// Field names follow the external-dns wire format so the produced objects
/// are consumable by external-dns without translation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Fully qualified record name.
    pub dns_name: String,

    /// Record TTL in seconds.
    #[serde(rename = "recordTTL")]
    pub record_ttl: i64,

    /// Record type: `A` or `NS`.
    pub record_type: String,

    /// Record targets: IPv4 addresses for `A`, nameserver hostnames for `NS`.
    pub targets: Vec<String>,
}

/// `DNSEndpoint` carries DNS records to an external-dns compatible integration.
///
/// The operator maintains one endpoint object per purpose: `gslb` host
/// records (owned by the Gslb, deleted with it) and `k8gb-ns-<provider>`
/// zone-delegation records for the declarative provider family.
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "externaldns.k8s.io",
    version = "v1alpha1",
    kind = "DNSEndpoint",
    namespaced,
    doc = "DNSEndpoint holds a set of DNS records for consumption by an external-dns integration."
)]
#[serde(rename_all = "camelCase")]
pub struct DNSEndpointSpec {
    /// Records to publish.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
