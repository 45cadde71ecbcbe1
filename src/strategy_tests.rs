// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Unit tests for `strategy.rs`

use super::*;
use crate::crd::{GslbHost, GslbSpec};
use std::collections::HashMap;

/// Prober answering from a fixed map, like a set of reachable peers would.
struct FakeProber {
    targets: HashMap<String, Vec<String>>,
}

impl FakeProber {
    fn new(targets: &[(&str, &[&str])]) -> Self {
        Self {
            targets: targets
                .iter()
                .map(|(host, ips)| {
                    (
                        (*host).to_string(),
                        ips.iter().map(|ip| (*ip).to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    fn empty() -> Self {
        Self {
            targets: HashMap::new(),
        }
    }
}

#[async_trait]
impl PeerProber for FakeProber {
    async fn external_targets(&self, host: &str) -> Vec<String> {
        self.targets.get(host).cloned().unwrap_or_default()
    }
}

fn test_config() -> Config {
    Config {
        cluster_geo_tag: "us".to_string(),
        ext_clusters_geo_tags: vec!["uk".to_string(), "eu".to_string()],
        dns_zone: "cloud.example.com".to_string(),
        edge_dns_zone: "example.com".to_string(),
        ..Config::default()
    }
}

fn test_gslb(strategy: Strategy) -> Gslb {
    let mut gslb = Gslb::new(
        "app",
        GslbSpec {
            hosts: vec![GslbHost {
                host: "app.cloud.example.com".to_string(),
                service: "app-frontend".to_string(),
            }],
            strategy,
        },
    );
    gslb.metadata.namespace = Some("test-gslb".to_string());
    gslb
}

fn round_robin() -> Strategy {
    Strategy::default()
}

fn failover(primary: &str) -> Strategy {
    Strategy {
        r#type: StrategyType::Failover,
        primary_geo_tag: Some(primary.to_string()),
        ..Strategy::default()
    }
}

fn health(status: HealthStatus) -> BTreeMap<String, HealthStatus> {
    [("app.cloud.example.com".to_string(), status)]
        .into_iter()
        .collect()
}

fn targets(ips: &[&str]) -> Vec<String> {
    ips.iter().map(|ip| (*ip).to_string()).collect()
}

#[test]
fn test_final_targets_round_robin_all_healthy() {
    let result = final_targets(
        &round_robin(),
        HealthStatus::Healthy,
        "us",
        &targets(&["10.0.0.1"]),
        &targets(&["10.0.0.3", "10.0.0.2"]),
    );

    assert_eq!(result, targets(&["10.0.0.1", "10.0.0.2", "10.0.0.3"]));
}

#[test]
fn test_final_targets_round_robin_unhealthy_drops_local() {
    let result = final_targets(
        &round_robin(),
        HealthStatus::Unhealthy,
        "us",
        &targets(&["10.0.0.1"]),
        &targets(&["10.0.0.2"]),
    );

    assert_eq!(result, targets(&["10.0.0.2"]));
}

#[test]
fn test_final_targets_failover_primary_healthy() {
    let result = final_targets(
        &failover("us"),
        HealthStatus::Healthy,
        "us",
        &targets(&["10.0.0.1"]),
        &targets(&["10.0.0.2"]),
    );

    assert_eq!(result, targets(&["10.0.0.1"]));
}

#[test]
fn test_final_targets_failover_primary_unhealthy() {
    let result = final_targets(
        &failover("us"),
        HealthStatus::Unhealthy,
        "us",
        &targets(&["10.0.0.1"]),
        &targets(&["10.0.0.2"]),
    );

    assert_eq!(result, targets(&["10.0.0.2"]));
}

#[test]
fn test_final_targets_failover_secondary_prefers_external() {
    let result = final_targets(
        &failover("us"),
        HealthStatus::Healthy,
        "uk",
        &targets(&["10.1.0.1"]),
        &targets(&["10.0.0.1"]),
    );

    assert_eq!(result, targets(&["10.0.0.1"]));
}

#[test]
fn test_final_targets_failover_secondary_without_externals_is_empty() {
    // A healthy secondary with no reachable external targets publishes
    // nothing; it does not fall back to its own targets.
    let result = final_targets(
        &failover("us"),
        HealthStatus::Healthy,
        "uk",
        &targets(&["10.1.0.1"]),
        &[],
    );

    assert!(result.is_empty());
}

#[test]
fn test_final_targets_sorted_and_deduplicated() {
    let result = final_targets(
        &round_robin(),
        HealthStatus::Healthy,
        "us",
        &targets(&["10.0.0.2", "10.0.0.1"]),
        &targets(&["10.0.0.2", "10.0.0.10"]),
    );

    // Lexicographic order, duplicates collapsed.
    assert_eq!(result, targets(&["10.0.0.1", "10.0.0.10", "10.0.0.2"]));
}

#[tokio::test]
async fn test_gslb_endpoint_round_robin_all_healthy() {
    let gslb = test_gslb(round_robin());
    let config = test_config();
    let prober = FakeProber::new(&[("app.cloud.example.com", &["10.0.0.2", "10.0.0.3"])]);

    let endpoint = gslb_endpoint(
        &gslb,
        &config,
        &health(HealthStatus::Healthy),
        &targets(&["10.0.0.1"]),
        &prober,
    )
    .await
    .unwrap();

    let records = &endpoint.spec.endpoints;
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].dns_name, "localtargets-app.cloud.example.com");
    assert_eq!(records[0].record_type, "A");
    assert_eq!(records[0].record_ttl, 30);
    assert_eq!(records[0].targets, targets(&["10.0.0.1"]));

    assert_eq!(records[1].dns_name, "app.cloud.example.com");
    assert_eq!(records[1].record_type, "A");
    assert_eq!(
        records[1].targets,
        targets(&["10.0.0.1", "10.0.0.2", "10.0.0.3"])
    );
}

#[tokio::test]
async fn test_gslb_endpoint_metadata() {
    let gslb = test_gslb(round_robin());
    let config = test_config();
    let prober = FakeProber::empty();

    let endpoint = gslb_endpoint(
        &gslb,
        &config,
        &health(HealthStatus::Healthy),
        &targets(&["10.0.0.1"]),
        &prober,
    )
    .await
    .unwrap();

    assert_eq!(endpoint.metadata.name.as_deref(), Some("app"));
    assert_eq!(endpoint.metadata.namespace.as_deref(), Some("test-gslb"));
    let annotations = endpoint.metadata.annotations.unwrap();
    assert_eq!(
        annotations.get("k8gb.absa.oss/dnstype").map(String::as_str),
        Some("local")
    );
}

#[tokio::test]
async fn test_gslb_endpoint_unhealthy_suppresses_localtargets() {
    let gslb = test_gslb(failover("us"));
    let config = test_config();
    let prober = FakeProber::new(&[("app.cloud.example.com", &["10.0.0.2"])]);

    let endpoint = gslb_endpoint(
        &gslb,
        &config,
        &health(HealthStatus::Unhealthy),
        &targets(&["10.0.0.1"]),
        &prober,
    )
    .await
    .unwrap();

    // Only the host record survives, carrying the failover targets.
    let records = &endpoint.spec.endpoints;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].dns_name, "app.cloud.example.com");
    assert_eq!(records[0].targets, targets(&["10.0.0.2"]));
}

#[tokio::test]
async fn test_gslb_endpoint_secondary_without_externals_keeps_only_localtargets() {
    let gslb = test_gslb(failover("us"));
    let mut config = test_config();
    config.cluster_geo_tag = "uk".to_string();
    let prober = FakeProber::empty();

    let endpoint = gslb_endpoint(
        &gslb,
        &config,
        &health(HealthStatus::Healthy),
        &targets(&["10.1.0.1"]),
        &prober,
    )
    .await
    .unwrap();

    let records = &endpoint.spec.endpoints;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].dns_name, "localtargets-app.cloud.example.com");
}

#[tokio::test]
async fn test_gslb_endpoint_rejects_host_outside_edge_zone() {
    let mut gslb = test_gslb(round_robin());
    gslb.spec.hosts[0].host = "app.other.example.com".to_string();
    let mut config = test_config();
    config.edge_dns_zone = "cloud.example.com".to_string();
    let prober = FakeProber::empty();
    let service_health = [(
        "app.other.example.com".to_string(),
        HealthStatus::Healthy,
    )]
    .into_iter()
    .collect();

    let result = gslb_endpoint(
        &gslb,
        &config,
        &service_health,
        &targets(&["10.0.0.1"]),
        &prober,
    )
    .await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("app.other.example.com"));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_gslb_endpoint_is_idempotent() {
    let gslb = test_gslb(round_robin());
    let config = test_config();
    let prober = FakeProber::new(&[("app.cloud.example.com", &["10.0.0.3", "10.0.0.2"])]);
    let service_health = health(HealthStatus::Healthy);
    let local = targets(&["10.0.0.1"]);

    let first = gslb_endpoint(&gslb, &config, &service_health, &local, &prober)
        .await
        .unwrap();
    let second = gslb_endpoint(&gslb, &config, &service_health, &local, &prober)
        .await
        .unwrap();

    assert_eq!(first.spec, second.spec);
}
