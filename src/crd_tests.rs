// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Unit tests for `crd.rs`

use super::*;

#[test]
fn test_strategy_defaults_from_empty_spec() {
    let strategy: Strategy = serde_json::from_str("{}").unwrap();

    assert_eq!(strategy.r#type, StrategyType::RoundRobin);
    assert_eq!(strategy.primary_geo_tag, None);
    assert_eq!(strategy.dns_ttl_seconds, 30);
    assert_eq!(strategy.split_brain_threshold_seconds, 300);
}

#[test]
fn test_strategy_type_wire_names() {
    let round_robin: StrategyType = serde_json::from_str(r#""roundRobin""#).unwrap();
    let failover: StrategyType = serde_json::from_str(r#""failover""#).unwrap();

    assert_eq!(round_robin, StrategyType::RoundRobin);
    assert_eq!(failover, StrategyType::Failover);
}

#[test]
fn test_gslb_spec_deserializes_from_camel_case() {
    let spec: GslbSpec = serde_json::from_str(
        r#"{
            "hosts": [
                {"host": "app.cloud.example.com", "service": "app-frontend"}
            ],
            "strategy": {
                "type": "failover",
                "primaryGeoTag": "eu",
                "dnsTtlSeconds": 60,
                "splitBrainThresholdSeconds": 600
            }
        }"#,
    )
    .unwrap();

    assert_eq!(spec.hosts.len(), 1);
    assert_eq!(spec.hosts[0].host, "app.cloud.example.com");
    assert_eq!(spec.hosts[0].service, "app-frontend");
    assert_eq!(spec.strategy.r#type, StrategyType::Failover);
    assert_eq!(spec.strategy.primary_geo_tag.as_deref(), Some("eu"));
    assert_eq!(spec.strategy.dns_ttl_seconds, 60);
    assert_eq!(spec.strategy.split_brain_threshold_seconds, 600);
}

#[test]
fn test_endpoint_external_dns_wire_format() {
    let endpoint = Endpoint {
        dns_name: "app.cloud.example.com".to_string(),
        record_ttl: 30,
        record_type: "A".to_string(),
        targets: vec!["10.0.0.1".to_string()],
    };

    let json = serde_json::to_value(&endpoint).unwrap();

    // Field names must match what external-dns consumes.
    assert_eq!(json["dnsName"], "app.cloud.example.com");
    assert_eq!(json["recordTTL"], 30);
    assert_eq!(json["recordType"], "A");
    assert_eq!(json["targets"][0], "10.0.0.1");
}

#[test]
fn test_dns_endpoint_spec_round_trip() {
    let spec = DNSEndpointSpec {
        endpoints: vec![Endpoint {
            dns_name: "cloud.example.com".to_string(),
            record_ttl: 30,
            record_type: "NS".to_string(),
            targets: vec![
                "gslb-ns-cloud-example-com-eu.example.com".to_string(),
                "gslb-ns-cloud-example-com-us.example.com".to_string(),
            ],
        }],
    };

    let json = serde_json::to_string(&spec).unwrap();
    let parsed: DNSEndpointSpec = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, spec);
}

#[test]
fn test_health_status_display() {
    assert_eq!(HealthStatus::Healthy.to_string(), "Healthy");
    assert_eq!(HealthStatus::Unhealthy.to_string(), "Unhealthy");
    assert_eq!(HealthStatus::Unknown.to_string(), "Unknown");
}

#[test]
fn test_strategy_type_display() {
    assert_eq!(StrategyType::RoundRobin.to_string(), "roundRobin");
    assert_eq!(StrategyType::Failover.to_string(), "failover");
}
