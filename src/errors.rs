// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Typed error kinds for the DNS reconciliation engine.
//!
//! This module provides structured errors for:
//! - Edge DNS probing (A and TXT lookups)
//! - Cluster inventory lookups (ingress, exposed CoreDNS service)
//! - Strategy resolution (misconfigured hosts)
//! - Zone publication (delegated zone safety gates, provider API failures)
//!
//! Reconcilers surface these through `anyhow::Result`; the kinds exist so
//! callers can distinguish transient lookup failures (requeue) from
//! misconfiguration (stable refusal).

use thiserror::Error;

/// Errors raised by the edge DNS probe.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// No resolver address was configured.
    #[error("empty edge DNS server")]
    EmptyServer,

    /// The DNS exchange itself failed (timeout, network, malformed answer).
    #[error("can't query {fqdn} at {server}: {reason}")]
    QueryFailed {
        /// Resolver address the query was sent to.
        server: String,
        /// Name that was being resolved.
        fqdn: String,
        /// Underlying failure.
        reason: String,
    },
}

/// Errors raised while collecting the local cluster inventory.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// The ingress backing the Gslb does not exist yet.
    #[error("can't find gslb ingress {namespace}/{name}")]
    IngressNotFound {
        /// Ingress namespace.
        namespace: String,
        /// Ingress name.
        name: String,
    },

    /// The exposed CoreDNS service does not exist.
    #[error("can't find {name} service in {namespace}")]
    ServiceNotFound {
        /// Service namespace.
        namespace: String,
        /// Service name.
        name: String,
    },

    /// The exposed CoreDNS service has no load-balancer ingress entries yet.
    #[error("no LoadBalancer ingress entries found for {name} service")]
    NoLoadBalancer {
        /// Service name.
        name: String,
    },
}

/// Errors raised by the strategy resolver.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// An advertised host is not a subdomain of the edge DNS zone.
    #[error("gslb host {host} does not match delegated zone {edge_dns_zone}")]
    MisconfiguredHost {
        /// The offending hostname.
        host: String,
        /// The configured edge DNS zone.
        edge_dns_zone: String,
    },
}

/// Errors raised by the zone publisher.
#[derive(Error, Debug)]
pub enum PublishError {
    /// The delegated zone returned by the provider is not the zone that was
    /// asked for. Refusing to touch it guards against provider aliasing.
    #[error("delegated zone returned from provider ({found}) does not match requested zone ({requested})")]
    MisdelegatedZone {
        /// Fqdn the provider returned.
        found: String,
        /// Zone the operator manages.
        requested: String,
    },

    /// A provider API call failed.
    #[error("provider API call {operation} failed: {reason}")]
    ProviderFailure {
        /// Operation that failed, e.g. `updateZoneDelegated`.
        operation: String,
        /// Underlying failure.
        reason: String,
    },
}

/// Composite error for the reconcile path.
#[derive(Error, Debug)]
pub enum GslbError {
    /// Edge DNS probe failure.
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// Cluster inventory failure.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Strategy resolution failure.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Zone publication failure.
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// Unexpected Kubernetes API failure.
    #[error(transparent)]
    Kube(#[from] kube::Error),
}

impl GslbError {
    /// Returns true when the error is transient and the reconcile should be
    /// retried as-is. Misconfiguration is not transient: retrying without a
    /// spec change cannot succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Probe(_) | Self::Inventory(_) | Self::Kube(_) => true,
            Self::Publish(PublishError::ProviderFailure { .. }) => true,
            Self::Publish(PublishError::MisdelegatedZone { .. }) | Self::Resolve(_) => false,
        }
    }

    /// CamelCase reason code for status conditions.
    #[must_use]
    pub fn status_reason(&self) -> &'static str {
        match self {
            Self::Probe(ProbeError::EmptyServer) => "EmptyEdgeDnsServer",
            Self::Probe(ProbeError::QueryFailed { .. }) => "EdgeDnsQueryFailed",
            Self::Inventory(InventoryError::IngressNotFound { .. }) => "IngressNotFound",
            Self::Inventory(InventoryError::ServiceNotFound { .. }) => "ServiceNotFound",
            Self::Inventory(InventoryError::NoLoadBalancer { .. }) => "NoLoadBalancer",
            Self::Resolve(ResolveError::MisconfiguredHost { .. }) => "MisconfiguredHost",
            Self::Publish(PublishError::MisdelegatedZone { .. }) => "MisdelegatedZone",
            Self::Publish(PublishError::ProviderFailure { .. }) => "ProviderFailure",
            Self::Kube(_) => "KubeApiFailure",
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
