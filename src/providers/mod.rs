// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Edge DNS providers: the zone publisher backends.
//!
//! The three backends share a small capability set: publish the zone
//! delegation for a Gslb, and tear it down on finalization. Route53 and NS1
//! are a single declarative implementation parameterised by the provider
//! name; Infoblox mutates the delegated zone imperatively and carries the
//! heartbeat protocol.

pub mod external_dns;
pub mod infoblox;
pub mod wapi;

use crate::assistant::GslbAssistant;
use crate::config::{Config, EdgeDnsType};
use crate::crd::Gslb;
use crate::providers::external_dns::ExternalDns;
use crate::providers::infoblox::Infoblox;
use crate::providers::wapi::{DelegationApi, FakeDelegationStore, WapiClient};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Capability set shared by all edge DNS backends.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Publish (or refresh) the zone delegation for a Gslb.
    async fn publish_zone_delegation(&self, gslb: &Gslb) -> Result<()>;

    /// Remove this cluster's delegation artifacts. Peer entries are never touched.
    async fn finalize(&self, gslb: &Gslb) -> Result<()>;
}

/// Backend used when no edge DNS is configured: the host endpoint is still
/// published by the reconciler, but no delegation exists to manage.
struct NoEdgeDns;

#[async_trait]
impl DnsProvider for NoEdgeDns {
    async fn publish_zone_delegation(&self, _gslb: &Gslb) -> Result<()> {
        debug!("No edge DNS configured, skipping zone delegation");
        Ok(())
    }

    async fn finalize(&self, _gslb: &Gslb) -> Result<()> {
        Ok(())
    }
}

/// Select the provider implementation for the configured edge DNS type.
///
/// # Errors
///
/// Fails when the Infoblox WAPI client cannot be constructed.
pub fn provider_for(config: &Arc<Config>, assistant: GslbAssistant) -> Result<Box<dyn DnsProvider>> {
    let provider: Box<dyn DnsProvider> = match config.edge_dns_type {
        EdgeDnsType::NoEdgeDns => Box::new(NoEdgeDns),
        EdgeDnsType::Route53 => Box::new(ExternalDns::new(config.clone(), assistant, "route53")),
        EdgeDnsType::Ns1 => Box::new(ExternalDns::new(config.clone(), assistant, "ns1")),
        EdgeDnsType::Infoblox => {
            let api: Box<dyn DelegationApi> = if config.overrides.fake_infoblox_enabled {
                Box::new(FakeDelegationStore::new())
            } else {
                Box::new(WapiClient::new(&config.infoblox)?)
            };
            Box::new(Infoblox::new(config.clone(), assistant, api))
        }
    };
    Ok(provider)
}
