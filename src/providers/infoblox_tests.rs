// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Unit tests for `infoblox.rs`

use super::*;
use crate::providers::wapi::{FakeDelegationStore, ZoneDelegated};
use chrono::NaiveDate;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 14)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn ns(address: &str, name: &str) -> NameServer {
    NameServer {
        address: address.to_string(),
        name: name.to_string(),
    }
}

const LOCAL_NS: &str = "gslb-ns-cloud-example-com-us.example.com";
const UK_NS: &str = "gslb-ns-cloud-example-com-uk.example.com";
const EU_NS: &str = "gslb-ns-cloud-example-com-eu.example.com";
const DNS_ZONE: &str = "cloud.example.com";

#[test]
fn test_heartbeat_timestamp_format() {
    assert_eq!(heartbeat_timestamp(now()), "2026-03-14T12:00:00");
}

#[test]
fn test_heartbeat_alive_within_threshold() {
    let texts = vec!["2026-03-14T11:59:00".to_string()];

    assert!(heartbeat_is_alive(&texts, now(), 300));
}

#[test]
fn test_heartbeat_dead_past_threshold() {
    // Ten minutes old against a five minute threshold.
    let texts = vec!["2026-03-14T11:50:00".to_string()];

    assert!(!heartbeat_is_alive(&texts, now(), 300));
}

#[test]
fn test_heartbeat_exactly_at_threshold_is_alive() {
    let texts = vec!["2026-03-14T11:55:00".to_string()];

    assert!(heartbeat_is_alive(&texts, now(), 300));
}

#[test]
fn test_heartbeat_survives_wire_quoting() {
    let texts = vec!["\"2026-03-14T11:59:00\"".to_string()];

    assert!(heartbeat_is_alive(&texts, now(), 300));
}

#[test]
fn test_heartbeat_garbage_counts_as_dead() {
    assert!(!heartbeat_is_alive(&["not a timestamp".to_string()], now(), 300));
    assert!(!heartbeat_is_alive(&[String::new()], now(), 300));
    assert!(!heartbeat_is_alive(&[], now(), 300));
}

#[test]
fn test_filter_out_delegate_to() {
    let entries = vec![
        ns("10.0.0.1", LOCAL_NS),
        ns("10.0.0.2", UK_NS),
        ns("10.0.0.3", LOCAL_NS),
    ];

    let filtered = filter_out_delegate_to(entries, LOCAL_NS);

    assert_eq!(filtered, vec![ns("10.0.0.2", UK_NS)]);
}

#[tokio::test]
async fn test_configure_creates_missing_zone() {
    let store = FakeDelegationStore::new();

    configure_delegated_zone(
        &store,
        DNS_ZONE,
        LOCAL_NS,
        vec![ns("10.0.0.1", LOCAL_NS)],
        &[],
    )
    .await
    .unwrap();

    assert_eq!(
        store.delegate_to(DNS_ZONE).unwrap(),
        vec![ns("10.0.0.1", LOCAL_NS)]
    );
}

#[tokio::test]
async fn test_configure_replaces_own_stale_entries() {
    let store = FakeDelegationStore::new();
    store.seed_zone(
        DNS_ZONE,
        vec![ns("10.9.9.9", LOCAL_NS), ns("10.0.0.2", UK_NS)],
    );

    configure_delegated_zone(
        &store,
        DNS_ZONE,
        LOCAL_NS,
        vec![ns("10.0.0.1", LOCAL_NS)],
        &[],
    )
    .await
    .unwrap();

    assert_eq!(
        store.delegate_to(DNS_ZONE).unwrap(),
        vec![ns("10.0.0.2", UK_NS), ns("10.0.0.1", LOCAL_NS)]
    );
}

#[tokio::test]
async fn test_configure_prunes_stale_peer() {
    let store = FakeDelegationStore::new();
    store.seed_zone(
        DNS_ZONE,
        vec![
            ns("10.0.0.1", LOCAL_NS),
            ns("10.0.0.2", UK_NS),
            ns("10.0.0.3", EU_NS),
        ],
    );

    configure_delegated_zone(
        &store,
        DNS_ZONE,
        LOCAL_NS,
        vec![ns("10.0.0.1", LOCAL_NS)],
        &[EU_NS.to_string()],
    )
    .await
    .unwrap();

    let delegate_to = store.delegate_to(DNS_ZONE).unwrap();
    assert!(delegate_to.iter().all(|entry| entry.name != EU_NS));
    assert!(delegate_to.contains(&ns("10.0.0.2", UK_NS)));
    assert!(delegate_to.contains(&ns("10.0.0.1", LOCAL_NS)));
}

#[tokio::test]
async fn test_configure_dead_peer_never_removes_local_entries() {
    let store = FakeDelegationStore::new();
    store.seed_zone(DNS_ZONE, vec![ns("10.0.0.3", EU_NS)]);

    // Both peers look dead; the local entries must still land.
    configure_delegated_zone(
        &store,
        DNS_ZONE,
        LOCAL_NS,
        vec![ns("10.0.0.1", LOCAL_NS)],
        &[UK_NS.to_string(), EU_NS.to_string()],
    )
    .await
    .unwrap();

    assert_eq!(
        store.delegate_to(DNS_ZONE).unwrap(),
        vec![ns("10.0.0.1", LOCAL_NS)]
    );
}

#[tokio::test]
async fn test_configure_is_idempotent() {
    let store = FakeDelegationStore::new();
    store.seed_zone(
        DNS_ZONE,
        vec![ns("10.0.0.2", UK_NS), ns("10.0.0.3", EU_NS)],
    );

    for _ in 0..2 {
        configure_delegated_zone(
            &store,
            DNS_ZONE,
            LOCAL_NS,
            vec![ns("10.0.0.1", LOCAL_NS)],
            &[EU_NS.to_string()],
        )
        .await
        .unwrap();
    }

    assert_eq!(
        store.delegate_to(DNS_ZONE).unwrap(),
        vec![ns("10.0.0.2", UK_NS), ns("10.0.0.1", LOCAL_NS)]
    );
}

/// Provider returning a zone whose FQDN differs from the one requested.
struct AliasedZoneApi;

#[async_trait]
impl DelegationApi for AliasedZoneApi {
    async fn get_zone_delegated(
        &self,
        _fqdn: &str,
    ) -> Result<Option<ZoneDelegated>, PublishError> {
        Ok(Some(ZoneDelegated {
            zone_ref: "zone_delegated/other".to_string(),
            fqdn: "other.example.com".to_string(),
            delegate_to: Vec::new(),
        }))
    }

    async fn create_zone_delegated(
        &self,
        _fqdn: &str,
        _delegate_to: &[NameServer],
    ) -> Result<(), PublishError> {
        Ok(())
    }

    async fn update_zone_delegated(
        &self,
        _zone_ref: &str,
        _delegate_to: &[NameServer],
    ) -> Result<(), PublishError> {
        panic!("a misdelegated zone must never be updated");
    }

    async fn delete_zone_delegated(&self, _zone_ref: &str) -> Result<(), PublishError> {
        panic!("a misdelegated zone must never be deleted");
    }

    async fn get_txt_record(
        &self,
        _name: &str,
    ) -> Result<Option<crate::providers::wapi::TxtRecord>, PublishError> {
        Ok(None)
    }

    async fn create_txt_record(
        &self,
        _name: &str,
        _text: &str,
        _ttl: i64,
        _view: &str,
    ) -> Result<(), PublishError> {
        Ok(())
    }

    async fn update_txt_record(&self, _record_ref: &str, _text: &str) -> Result<(), PublishError> {
        Ok(())
    }

    async fn delete_txt_record(&self, _record_ref: &str) -> Result<(), PublishError> {
        Ok(())
    }
}

#[tokio::test]
async fn test_configure_refuses_misdelegated_zone() {
    let api = AliasedZoneApi;

    let result =
        configure_delegated_zone(&api, DNS_ZONE, LOCAL_NS, vec![ns("10.0.0.1", LOCAL_NS)], &[])
            .await;

    assert!(matches!(
        result,
        Err(PublishError::MisdelegatedZone { .. })
    ));
}

#[tokio::test]
async fn test_finalize_refuses_misdelegated_zone() {
    let api = AliasedZoneApi;

    let result = finalize_delegated_zone(&api, DNS_ZONE, "app-heartbeat-us.example.com").await;

    assert!(matches!(
        result,
        Err(PublishError::MisdelegatedZone { .. })
    ));
}

#[tokio::test]
async fn test_refresh_heartbeat_creates_then_updates() {
    let store = FakeDelegationStore::new();
    let name = "app-heartbeat-us.example.com";

    refresh_heartbeat(&store, name, "2026-03-14T12:00:00", 30)
        .await
        .unwrap();
    assert_eq!(store.txt_text(name).as_deref(), Some("2026-03-14T12:00:00"));

    refresh_heartbeat(&store, name, "2026-03-14T12:00:30", 30)
        .await
        .unwrap();
    assert_eq!(store.txt_text(name).as_deref(), Some("2026-03-14T12:00:30"));
}

#[tokio::test]
async fn test_finalize_removes_zone_and_own_heartbeat() {
    let store = FakeDelegationStore::new();
    store.seed_zone(DNS_ZONE, vec![ns("10.0.0.1", LOCAL_NS)]);
    store
        .create_txt_record(
            "app-heartbeat-us.example.com",
            "2026-03-14T12:00:00",
            30,
            "default",
        )
        .await
        .unwrap();
    store
        .create_txt_record(
            "app-heartbeat-uk.example.com",
            "2026-03-14T12:00:00",
            30,
            "default",
        )
        .await
        .unwrap();

    finalize_delegated_zone(&store, DNS_ZONE, "app-heartbeat-us.example.com")
        .await
        .unwrap();

    assert!(store.delegate_to(DNS_ZONE).is_none());
    assert!(store.txt_text("app-heartbeat-us.example.com").is_none());
    // Peer heartbeats are never touched.
    assert!(store.txt_text("app-heartbeat-uk.example.com").is_some());
}

#[tokio::test]
async fn test_finalize_tolerates_missing_artifacts() {
    let store = FakeDelegationStore::new();

    finalize_delegated_zone(&store, DNS_ZONE, "app-heartbeat-us.example.com")
        .await
        .unwrap();
}
