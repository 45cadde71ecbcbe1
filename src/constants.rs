// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Global constants for the k8gb operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for the Gslb CRD
pub const API_GROUP: &str = "k8gb.absa.oss";

/// API version for the Gslb CRD
pub const API_VERSION: &str = "v1beta1";

/// Kind name for the `Gslb` resource
pub const KIND_GSLB: &str = "Gslb";

/// Finalizer placed on every reconciled Gslb
pub const GSLB_FINALIZER: &str = "finalize.gslb.absa.oss";

/// Annotation carrying the purpose of a published `DNSEndpoint`
pub const ANNOTATION_DNS_TYPE: &str = "k8gb.absa.oss/dnstype";

/// Annotation value for the per-Gslb host record endpoint
pub const DNS_TYPE_LOCAL: &str = "local";

// ============================================================================
// DNS Protocol Constants
// ============================================================================

/// Standard DNS service port used for edge and peer queries
pub const DNS_PORT: u16 = 53;

/// Loopback resolver substituted for the edge DNS server when `FAKE_DNS_ENABLED` is set
pub const FAKE_DNS_ADDRESS: &str = "127.0.0.1:7753";

/// Default TTL for published records when the Gslb spec does not set one (30 seconds)
pub const DEFAULT_DNS_TTL_SECS: i64 = 30;

/// Default split-brain threshold for peer heartbeats (5 minutes)
pub const DEFAULT_SPLIT_BRAIN_THRESHOLD_SECS: i64 = 300;

/// Timestamp layout used in heartbeat TXT records (UTC, no timezone suffix)
pub const HEARTBEAT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Per-peer timeout for `localtargets-` A probes and heartbeat TXT probes
pub const PEER_PROBE_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// Well-known Kubernetes Object Names
// ============================================================================

/// Front-facing CoreDNS load-balancer service consulted when `COREDNS_EXPOSED` is set
pub const COREDNS_EXT_SERVICE_NAME: &str = "k8gb-coredns-lb";

/// Name prefix for published `localtargets-` A records
pub const LOCAL_TARGETS_PREFIX: &str = "localtargets";

// ============================================================================
// Controller Constants
// ============================================================================

/// Requeue duration after a reconcile error (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Default steady-state requeue cadence (30 seconds)
pub const DEFAULT_RECONCILE_REQUEUE_SECS: u64 = 30;

/// Number of worker threads for the Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Infoblox Constants
// ============================================================================

/// DNS view used for heartbeat TXT records
pub const INFOBLOX_DNS_VIEW: &str = "default";

/// Default Infoblox WAPI port
pub const DEFAULT_INFOBLOX_WAPI_PORT: u16 = 443;

/// HTTP timeout for WAPI calls (20 seconds, matching the grid appliance defaults)
pub const INFOBLOX_HTTP_TIMEOUT_SECS: u64 = 20;
