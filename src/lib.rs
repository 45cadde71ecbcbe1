// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! # k8gb - Global Server Load Balancing operator for Kubernetes
//!
//! k8gb keeps a workload replicated across several independent clusters
//! reachable through a single stable name. Each cluster runs its own
//! instance of the operator; the instances never talk to each other
//! directly, they coordinate exclusively through records in a shared edge
//! DNS zone.
//!
//! ## How it works
//!
//! Every reconcile of a [`crd::Gslb`] runs the same pipeline:
//!
//! 1. The health oracle reads the backing services' endpoints
//!    ([`assistant`]).
//! 2. The local cluster's exposed IPs are discovered from the ingress or
//!    the exposed CoreDNS service ([`assistant`]).
//! 3. Peer clusters' `localtargets-` records are probed through the edge
//!    DNS and the configured strategy (round-robin or failover) computes
//!    the final target set ([`strategy`]).
//! 4. The resulting records are published: host records as a declarative
//!    [`crd::DNSEndpoint`], the zone delegation either declaratively
//!    (Route53, NS1) or imperatively against Infoblox, guarded against
//!    split brain by per-cluster heartbeat TXT records ([`providers`]).
//!
//! ## Modules
//!
//! - [`crd`] - `Gslb` and `DNSEndpoint` resource types
//! - [`config`] - environment-resolved operator configuration
//! - [`probe`] - edge DNS A/TXT lookups
//! - [`names`] - canonical NS, heartbeat and localtargets names
//! - [`assistant`] - cluster inventory, health oracle, endpoint upsert
//! - [`strategy`] - per-host target computation
//! - [`providers`] - edge DNS backends (external-dns, Infoblox)
//! - [`reconciler`] - the Gslb reconcile loop body

pub mod assistant;
pub mod config;
pub mod constants;
pub mod crd;
pub mod errors;
pub mod metrics;
pub mod names;
pub mod probe;
pub mod providers;
pub mod reconciler;
pub mod strategy;
