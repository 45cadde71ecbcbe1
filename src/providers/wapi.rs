// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Infoblox WAPI client for delegated-zone and TXT-record management.
//!
//! The imperative provider talks to the grid through the [`DelegationApi`]
//! trait; production uses the HTTP [`WapiClient`], while tests and the
//! `FAKE_INFOBLOX_ENABLED` override use the in-memory
//! [`FakeDelegationStore`].

use crate::config::InfobloxConfig;
use crate::constants::INFOBLOX_HTTP_TIMEOUT_SECS;
use crate::errors::PublishError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// One delegate-to entry of a delegated zone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameServer {
    /// Glue address of the nameserver.
    pub address: String,
    /// Nameserver hostname.
    pub name: String,
}

/// A delegated zone as returned by the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDelegated {
    /// Opaque object reference used for updates and deletion.
    #[serde(rename = "_ref", default)]
    pub zone_ref: String,
    /// Zone FQDN.
    #[serde(default)]
    pub fqdn: String,
    /// Nameservers the zone is delegated to.
    #[serde(default)]
    pub delegate_to: Vec<NameServer>,
}

/// A TXT record as returned by the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxtRecord {
    /// Opaque object reference used for updates and deletion.
    #[serde(rename = "_ref", default)]
    pub record_ref: String,
    /// Record name.
    #[serde(default)]
    pub name: String,
    /// Record payload.
    #[serde(default)]
    pub text: String,
}

/// Operations the imperative zone publisher needs from the edge DNS provider.
#[async_trait]
pub trait DelegationApi: Send + Sync {
    /// Look up a delegated zone by FQDN. `None` when the zone does not exist.
    async fn get_zone_delegated(&self, fqdn: &str) -> Result<Option<ZoneDelegated>, PublishError>;

    /// Create a delegated zone with the given delegate-to set.
    async fn create_zone_delegated(
        &self,
        fqdn: &str,
        delegate_to: &[NameServer],
    ) -> Result<(), PublishError>;

    /// Replace the delegate-to set of an existing zone.
    async fn update_zone_delegated(
        &self,
        zone_ref: &str,
        delegate_to: &[NameServer],
    ) -> Result<(), PublishError>;

    /// Delete a delegated zone by reference.
    async fn delete_zone_delegated(&self, zone_ref: &str) -> Result<(), PublishError>;

    /// Look up a TXT record by name. `None` when the record does not exist.
    async fn get_txt_record(&self, name: &str) -> Result<Option<TxtRecord>, PublishError>;

    /// Create a TXT record.
    async fn create_txt_record(
        &self,
        name: &str,
        text: &str,
        ttl: i64,
        view: &str,
    ) -> Result<(), PublishError>;

    /// Replace the payload of an existing TXT record.
    async fn update_txt_record(&self, record_ref: &str, text: &str) -> Result<(), PublishError>;

    /// Delete a TXT record by reference.
    async fn delete_txt_record(&self, record_ref: &str) -> Result<(), PublishError>;
}

/// HTTP client for the Infoblox WAPI.
pub struct WapiClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

#[derive(Serialize)]
struct ZoneDelegatedBody<'a> {
    fqdn: &'a str,
    delegate_to: &'a [NameServer],
}

#[derive(Serialize)]
struct DelegateToBody<'a> {
    delegate_to: &'a [NameServer],
}

#[derive(Serialize)]
struct TxtRecordBody<'a> {
    name: &'a str,
    text: &'a str,
    ttl: i64,
    view: &'a str,
}

#[derive(Serialize)]
struct TxtTextBody<'a> {
    text: &'a str,
}

impl WapiClient {
    /// Build a client from the grid connection parameters.
    ///
    /// # Errors
    ///
    /// Fails when the underlying HTTP client cannot be constructed.
    pub fn new(config: &InfobloxConfig) -> Result<Self, PublishError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(INFOBLOX_HTTP_TIMEOUT_SECS))
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| provider_failure("connect", &e))?;

        Ok(Self {
            http,
            base_url: format!(
                "https://{}:{}/wapi/v{}",
                config.grid_host, config.wapi_port, config.wapi_version
            ),
            username: config.wapi_username.clone(),
            password: config.wapi_password.clone(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        operation: &str,
        url: &str,
    ) -> Result<T, PublishError> {
        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| provider_failure(operation, &e))?
            .error_for_status()
            .map_err(|e| provider_failure(operation, &e))?;
        response
            .json::<T>()
            .await
            .map_err(|e| provider_failure(operation, &e))
    }

    async fn send_body<B: Serialize>(
        &self,
        operation: &str,
        method: reqwest::Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<(), PublishError> {
        let mut request = self
            .http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password));
        if let Some(body) = body {
            request = request.json(body);
        }
        request
            .send()
            .await
            .map_err(|e| provider_failure(operation, &e))?
            .error_for_status()
            .map_err(|e| provider_failure(operation, &e))?;
        Ok(())
    }
}

#[async_trait]
impl DelegationApi for WapiClient {
    async fn get_zone_delegated(&self, fqdn: &str) -> Result<Option<ZoneDelegated>, PublishError> {
        let url = format!(
            "{}/zone_delegated?fqdn={fqdn}&_return_fields=fqdn,delegate_to",
            self.base_url
        );
        let zones: Vec<ZoneDelegated> = self.get_json("getZoneDelegated", &url).await?;
        Ok(zones.into_iter().next())
    }

    async fn create_zone_delegated(
        &self,
        fqdn: &str,
        delegate_to: &[NameServer],
    ) -> Result<(), PublishError> {
        let url = format!("{}/zone_delegated", self.base_url);
        let body = ZoneDelegatedBody { fqdn, delegate_to };
        self.send_body("createZoneDelegated", reqwest::Method::POST, &url, Some(&body))
            .await
    }

    async fn update_zone_delegated(
        &self,
        zone_ref: &str,
        delegate_to: &[NameServer],
    ) -> Result<(), PublishError> {
        let url = format!("{}/{zone_ref}", self.base_url);
        let body = DelegateToBody { delegate_to };
        self.send_body("updateZoneDelegated", reqwest::Method::PUT, &url, Some(&body))
            .await
    }

    async fn delete_zone_delegated(&self, zone_ref: &str) -> Result<(), PublishError> {
        let url = format!("{}/{zone_ref}", self.base_url);
        self.send_body::<()>("deleteZoneDelegated", reqwest::Method::DELETE, &url, None)
            .await
    }

    async fn get_txt_record(&self, name: &str) -> Result<Option<TxtRecord>, PublishError> {
        let url = format!(
            "{}/record:txt?name={name}&_return_fields=name,text",
            self.base_url
        );
        let records: Vec<TxtRecord> = self.get_json("getTXTRecord", &url).await?;
        Ok(records.into_iter().next())
    }

    async fn create_txt_record(
        &self,
        name: &str,
        text: &str,
        ttl: i64,
        view: &str,
    ) -> Result<(), PublishError> {
        let url = format!("{}/record:txt", self.base_url);
        let body = TxtRecordBody {
            name,
            text,
            ttl,
            view,
        };
        self.send_body("createTXTRecord", reqwest::Method::POST, &url, Some(&body))
            .await
    }

    async fn update_txt_record(&self, record_ref: &str, text: &str) -> Result<(), PublishError> {
        let url = format!("{}/{record_ref}", self.base_url);
        let body = TxtTextBody { text };
        self.send_body("updateTXTRecord", reqwest::Method::PUT, &url, Some(&body))
            .await
    }

    async fn delete_txt_record(&self, record_ref: &str) -> Result<(), PublishError> {
        let url = format!("{}/{record_ref}", self.base_url);
        self.send_body::<()>("deleteTXTRecord", reqwest::Method::DELETE, &url, None)
            .await
    }
}

fn provider_failure(operation: &str, err: &dyn std::fmt::Display) -> PublishError {
    PublishError::ProviderFailure {
        operation: operation.to_string(),
        reason: err.to_string(),
    }
}

/// In-memory delegation store standing in for the grid during integration
/// tests (`FAKE_INFOBLOX_ENABLED`).
#[derive(Default)]
pub struct FakeDelegationStore {
    zones: Mutex<HashMap<String, ZoneDelegated>>,
    txt_records: Mutex<HashMap<String, TxtRecord>>,
}

impl FakeDelegationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a delegated zone, as if a previous reconcile had created it.
    pub fn seed_zone(&self, fqdn: &str, delegate_to: Vec<NameServer>) {
        let mut zones = self.zones.lock().expect("zones lock");
        zones.insert(
            fqdn.to_string(),
            ZoneDelegated {
                zone_ref: format!("zone_delegated/{fqdn}"),
                fqdn: fqdn.to_string(),
                delegate_to,
            },
        );
    }

    /// Current delegate-to set of a zone, for assertions.
    #[must_use]
    pub fn delegate_to(&self, fqdn: &str) -> Option<Vec<NameServer>> {
        let zones = self.zones.lock().expect("zones lock");
        zones.get(fqdn).map(|zone| zone.delegate_to.clone())
    }

    /// Current payload of a TXT record, for assertions.
    #[must_use]
    pub fn txt_text(&self, name: &str) -> Option<String> {
        let records = self.txt_records.lock().expect("txt lock");
        records.get(name).map(|record| record.text.clone())
    }
}

#[async_trait]
impl DelegationApi for FakeDelegationStore {
    async fn get_zone_delegated(&self, fqdn: &str) -> Result<Option<ZoneDelegated>, PublishError> {
        let zones = self.zones.lock().expect("zones lock");
        Ok(zones.get(fqdn).cloned())
    }

    async fn create_zone_delegated(
        &self,
        fqdn: &str,
        delegate_to: &[NameServer],
    ) -> Result<(), PublishError> {
        let mut zones = self.zones.lock().expect("zones lock");
        zones.insert(
            fqdn.to_string(),
            ZoneDelegated {
                zone_ref: format!("zone_delegated/{fqdn}"),
                fqdn: fqdn.to_string(),
                delegate_to: delegate_to.to_vec(),
            },
        );
        Ok(())
    }

    async fn update_zone_delegated(
        &self,
        zone_ref: &str,
        delegate_to: &[NameServer],
    ) -> Result<(), PublishError> {
        let mut zones = self.zones.lock().expect("zones lock");
        let zone = zones
            .values_mut()
            .find(|zone| zone.zone_ref == zone_ref)
            .ok_or_else(|| PublishError::ProviderFailure {
                operation: "updateZoneDelegated".to_string(),
                reason: format!("unknown reference {zone_ref}"),
            })?;
        zone.delegate_to = delegate_to.to_vec();
        Ok(())
    }

    async fn delete_zone_delegated(&self, zone_ref: &str) -> Result<(), PublishError> {
        let mut zones = self.zones.lock().expect("zones lock");
        zones.retain(|_, zone| zone.zone_ref != zone_ref);
        Ok(())
    }

    async fn get_txt_record(&self, name: &str) -> Result<Option<TxtRecord>, PublishError> {
        let records = self.txt_records.lock().expect("txt lock");
        Ok(records.get(name).cloned())
    }

    async fn create_txt_record(
        &self,
        name: &str,
        text: &str,
        _ttl: i64,
        _view: &str,
    ) -> Result<(), PublishError> {
        let mut records = self.txt_records.lock().expect("txt lock");
        records.insert(
            name.to_string(),
            TxtRecord {
                record_ref: format!("record:txt/{name}"),
                name: name.to_string(),
                text: text.to_string(),
            },
        );
        Ok(())
    }

    async fn update_txt_record(&self, record_ref: &str, text: &str) -> Result<(), PublishError> {
        let mut records = self.txt_records.lock().expect("txt lock");
        let record = records
            .values_mut()
            .find(|record| record.record_ref == record_ref)
            .ok_or_else(|| PublishError::ProviderFailure {
                operation: "updateTXTRecord".to_string(),
                reason: format!("unknown reference {record_ref}"),
            })?;
        record.text = text.to_string();
        Ok(())
    }

    async fn delete_txt_record(&self, record_ref: &str) -> Result<(), PublishError> {
        let mut records = self.txt_records.lock().expect("txt lock");
        records.retain(|_, record| record.record_ref != record_ref);
        Ok(())
    }
}

#[cfg(test)]
#[path = "wapi_tests.rs"]
mod wapi_tests;
