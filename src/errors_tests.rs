// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Unit tests for `errors.rs`

use super::*;

#[test]
fn test_transient_errors_requeue() {
    let probe: GslbError = ProbeError::QueryFailed {
        server: "1.1.1.1:53".to_string(),
        fqdn: "app.cloud.example.com.".to_string(),
        reason: "timeout".to_string(),
    }
    .into();
    let inventory: GslbError = InventoryError::IngressNotFound {
        namespace: "test-gslb".to_string(),
        name: "app".to_string(),
    }
    .into();
    let provider: GslbError = PublishError::ProviderFailure {
        operation: "updateZoneDelegated".to_string(),
        reason: "502 Bad Gateway".to_string(),
    }
    .into();

    assert!(probe.is_transient());
    assert!(inventory.is_transient());
    assert!(provider.is_transient());
}

#[test]
fn test_misconfiguration_is_not_transient() {
    let misconfigured: GslbError = ResolveError::MisconfiguredHost {
        host: "app.other.example.com".to_string(),
        edge_dns_zone: "cloud.example.com".to_string(),
    }
    .into();
    let misdelegated: GslbError = PublishError::MisdelegatedZone {
        found: "other.example.com".to_string(),
        requested: "cloud.example.com".to_string(),
    }
    .into();

    assert!(!misconfigured.is_transient());
    assert!(!misdelegated.is_transient());
}

#[test]
fn test_status_reasons() {
    let misconfigured: GslbError = ResolveError::MisconfiguredHost {
        host: "app.other.example.com".to_string(),
        edge_dns_zone: "cloud.example.com".to_string(),
    }
    .into();
    let no_lb: GslbError = InventoryError::NoLoadBalancer {
        name: "k8gb-coredns-lb".to_string(),
    }
    .into();

    assert_eq!(misconfigured.status_reason(), "MisconfiguredHost");
    assert_eq!(no_lb.status_reason(), "NoLoadBalancer");
}

#[test]
fn test_error_messages_are_human_readable() {
    let err = ResolveError::MisconfiguredHost {
        host: "app.other.example.com".to_string(),
        edge_dns_zone: "cloud.example.com".to_string(),
    };

    assert_eq!(
        err.to_string(),
        "gslb host app.other.example.com does not match delegated zone cloud.example.com"
    );
}
