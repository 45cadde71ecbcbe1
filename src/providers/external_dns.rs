// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Declarative zone publisher for external-dns backed providers.
//!
//! Route53 and NS1 share one implementation: the delegation lives in a
//! `DNSEndpoint` object (`k8gb-ns-<provider>`) that the external-dns
//! integration pushes to the edge, so the two backends differ only by the
//! provider name carried in the endpoint name and annotation.

use crate::assistant::GslbAssistant;
use crate::config::Config;
use crate::constants::ANNOTATION_DNS_TYPE;
use crate::crd::{DNSEndpoint, DNSEndpointSpec, Endpoint, Gslb};
use crate::names::{ns_server_name, ns_server_names_ext};
use crate::providers::DnsProvider;
use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::sync::Arc;
use tracing::info;

/// Declarative zone publisher, parameterised by the provider name.
pub struct ExternalDns {
    config: Arc<Config>,
    assistant: GslbAssistant,
    provider_name: String,
    endpoint_name: String,
}

impl ExternalDns {
    /// Create a publisher for `provider_name` (`route53` or `ns1`).
    #[must_use]
    pub fn new(config: Arc<Config>, assistant: GslbAssistant, provider_name: &str) -> Self {
        Self {
            config,
            assistant,
            provider_name: provider_name.to_string(),
            endpoint_name: format!("k8gb-ns-{provider_name}"),
        }
    }
}

#[async_trait]
impl DnsProvider for ExternalDns {
    async fn publish_zone_delegation(&self, gslb: &Gslb) -> Result<()> {
        info!(
            "Creating/Updating DNSEndpoint for {} zone delegation",
            self.provider_name
        );

        let ns_server_ips = if self.config.coredns_exposed {
            self.assistant.coredns_exposed_ips().await?
        } else {
            self.assistant.gslb_ingress_exposed_ips(gslb).await?
        };

        let ns_record = ns_record_endpoint(
            &self.config,
            &self.provider_name,
            &self.endpoint_name,
            gslb.spec.strategy.dns_ttl_seconds,
            ns_server_ips,
        );
        self.assistant.save_dns_endpoint(&ns_record).await
    }

    async fn finalize(&self, _gslb: &Gslb) -> Result<()> {
        info!("Removing {} zone delegation entries", self.provider_name);
        self.assistant.remove_endpoint(&self.endpoint_name).await
    }
}

/// Build the NS delegation endpoint: one NS record naming every cluster's NS
/// hostname (sorted), plus the glue A record for the local NS hostname.
#[must_use]
pub fn ns_record_endpoint(
    config: &Config,
    provider_name: &str,
    endpoint_name: &str,
    ttl: i64,
    ns_server_ips: Vec<String>,
) -> DNSEndpoint {
    let mut ns_server_list = vec![ns_server_name(config)];
    ns_server_list.extend(ns_server_names_ext(config));
    ns_server_list.sort();

    DNSEndpoint {
        metadata: ObjectMeta {
            name: Some(endpoint_name.to_string()),
            namespace: Some(config.k8gb_namespace.clone()),
            annotations: Some(
                [(ANNOTATION_DNS_TYPE.to_string(), provider_name.to_string())]
                    .into_iter()
                    .collect(),
            ),
            ..ObjectMeta::default()
        },
        spec: DNSEndpointSpec {
            endpoints: vec![
                Endpoint {
                    dns_name: config.dns_zone.clone(),
                    record_ttl: ttl,
                    record_type: "NS".to_string(),
                    targets: ns_server_list,
                },
                Endpoint {
                    dns_name: ns_server_name(config),
                    record_ttl: ttl,
                    record_type: "A".to_string(),
                    targets: ns_server_ips,
                },
            ],
        },
    }
}

#[cfg(test)]
#[path = "external_dns_tests.rs"]
mod external_dns_tests;
