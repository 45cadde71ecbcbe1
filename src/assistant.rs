// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Cluster inventory and endpoint persistence.
//!
//! [`GslbAssistant`] wraps every Kubernetes API interaction the engine needs:
//! discovering the IPs this cluster exposes, observing backing-service
//! health, and upserting the produced `DNSEndpoint` objects. It carries the
//! operator namespace and edge resolver so call sites never read the
//! environment.

use crate::crd::{DNSEndpoint, Gslb, HealthStatus};
use crate::constants::COREDNS_EXT_SERVICE_NAME;
use crate::errors::{GslbError, InventoryError};
use crate::probe;
use k8s_openapi::api::core::v1::{Endpoints, Service};
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{DeleteParams, PostParams};
use kube::{Api, Client, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Common wrapper operating on a Gslb instance: local inventory lookups,
/// service health, and `DNSEndpoint` persistence.
#[derive(Clone)]
pub struct GslbAssistant {
    client: Client,
    k8gb_namespace: String,
    edge_dns_server: String,
    fake_dns_enabled: bool,
}

impl GslbAssistant {
    /// Create an assistant bound to the operator namespace and edge resolver.
    #[must_use]
    pub fn new(
        client: Client,
        k8gb_namespace: &str,
        edge_dns_server: &str,
        fake_dns_enabled: bool,
    ) -> Self {
        Self {
            client,
            k8gb_namespace: k8gb_namespace.to_string(),
            edge_dns_server: edge_dns_server.to_string(),
            fake_dns_enabled,
        }
    }

    /// IPs exposed by the ingress advertising this Gslb's hostnames.
    ///
    /// Load-balancer entries carrying a literal IP contribute it directly;
    /// entries carrying only a hostname are resolved through the edge DNS.
    ///
    /// # Errors
    ///
    /// [`InventoryError::IngressNotFound`] when the ingress named after the
    /// Gslb does not exist; probe errors when hostname resolution fails.
    pub async fn gslb_ingress_exposed_ips(&self, gslb: &Gslb) -> Result<Vec<String>, GslbError> {
        let namespace = gslb.namespace().unwrap_or_default();
        let name = gslb.name_any();

        let api: Api<Ingress> = Api::namespaced(self.client.clone(), &namespace);
        let ingress = match api.get(&name).await {
            Ok(ingress) => ingress,
            Err(err) if is_not_found(&err) => {
                info!("Can't find gslb ingress {}/{}", namespace, name);
                return Err(InventoryError::IngressNotFound { namespace, name }.into());
            }
            Err(err) => return Err(err.into()),
        };

        let mut exposed = Vec::new();
        let lb_entries = ingress
            .status
            .and_then(|s| s.load_balancer)
            .and_then(|lb| lb.ingress)
            .unwrap_or_default();

        for entry in lb_entries {
            if let Some(ip) = entry.ip.filter(|ip| !ip.is_empty()) {
                exposed.push(ip);
            } else if let Some(hostname) = entry.hostname.filter(|h| !h.is_empty()) {
                let resolver = probe::resolver_address(self.fake_dns_enabled, &self.edge_dns_server);
                let ips = probe::resolve_a(&resolver, &hostname).await?;
                exposed.extend(ips);
            }
        }

        exposed.sort();
        exposed.dedup();
        Ok(exposed)
    }

    /// IPs exposed by the front-facing CoreDNS load-balancer service.
    ///
    /// # Errors
    ///
    /// [`InventoryError::ServiceNotFound`] when the service is absent,
    /// [`InventoryError::NoLoadBalancer`] when it has no load-balancer
    /// ingress entries yet.
    pub async fn coredns_exposed_ips(&self) -> Result<Vec<String>, GslbError> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), &self.k8gb_namespace);
        let service = match api.get(COREDNS_EXT_SERVICE_NAME).await {
            Ok(service) => service,
            Err(err) if is_not_found(&err) => {
                info!("Can't find {} service", COREDNS_EXT_SERVICE_NAME);
                return Err(InventoryError::ServiceNotFound {
                    namespace: self.k8gb_namespace.clone(),
                    name: COREDNS_EXT_SERVICE_NAME.to_string(),
                }
                .into());
            }
            Err(err) => return Err(err.into()),
        };

        let lb_hostname = service
            .status
            .and_then(|s| s.load_balancer)
            .and_then(|lb| lb.ingress)
            .and_then(|entries| entries.into_iter().next())
            .and_then(|entry| entry.hostname)
            .ok_or_else(|| InventoryError::NoLoadBalancer {
                name: COREDNS_EXT_SERVICE_NAME.to_string(),
            })?;

        let resolver = probe::resolver_address(self.fake_dns_enabled, &self.edge_dns_server);
        let ips = probe::resolve_a(&resolver, &lb_hostname).await?;
        Ok(ips)
    }

    /// Health of each advertised host, derived from the ready addresses of
    /// the backing service's Endpoints object.
    ///
    /// # Errors
    ///
    /// Propagates unexpected Kubernetes API failures; a missing service maps
    /// to [`HealthStatus::Unknown`] rather than an error.
    pub async fn service_health(
        &self,
        gslb: &Gslb,
    ) -> anyhow::Result<BTreeMap<String, HealthStatus>> {
        let namespace = gslb.namespace().unwrap_or_default();
        let services: Api<Service> = Api::namespaced(self.client.clone(), &namespace);
        let endpoints: Api<Endpoints> = Api::namespaced(self.client.clone(), &namespace);

        let mut health = BTreeMap::new();
        for host in &gslb.spec.hosts {
            let status = match services.get(&host.service).await {
                Ok(_) => match endpoints.get(&host.service).await {
                    Ok(ep) if has_ready_addresses(&ep) => HealthStatus::Healthy,
                    Ok(_) => HealthStatus::Unhealthy,
                    Err(err) if is_not_found(&err) => HealthStatus::Unhealthy,
                    Err(err) => return Err(err.into()),
                },
                Err(err) if is_not_found(&err) => {
                    debug!(
                        "Backing service {}/{} not found for host {}",
                        namespace, host.service, host.host
                    );
                    HealthStatus::Unknown
                }
                Err(err) => return Err(err.into()),
            };
            health.insert(host.host.clone(), status);
        }
        Ok(health)
    }

    /// Upsert a `DNSEndpoint`: create it when absent, otherwise overwrite the
    /// spec with the freshly computed one. Conflicts are not retried here;
    /// the controller requeues and the next reconcile wins.
    ///
    /// # Errors
    ///
    /// Propagates Kubernetes API failures.
    pub async fn save_dns_endpoint(&self, endpoint: &DNSEndpoint) -> anyhow::Result<()> {
        let namespace = endpoint
            .namespace()
            .unwrap_or_else(|| self.k8gb_namespace.clone());
        let name = endpoint.name_any();
        let api: Api<DNSEndpoint> = Api::namespaced(self.client.clone(), &namespace);

        match api.get(&name).await {
            Ok(mut found) => {
                found.spec = endpoint.spec.clone();
                api.replace(&name, &PostParams::default(), &found).await?;
                debug!("Updated DNSEndpoint {}/{}", namespace, name);
            }
            Err(err) if is_not_found(&err) => {
                info!("Creating a new DNSEndpoint {}/{}", namespace, name);
                api.create(&PostParams::default(), endpoint).await?;
            }
            Err(err) => {
                warn!("Failed to get DNSEndpoint {}/{}: {}", namespace, name, err);
                return Err(err.into());
            }
        }
        Ok(())
    }

    /// Delete an operator-owned endpoint by name, tolerating its absence.
    ///
    /// # Errors
    ///
    /// Propagates Kubernetes API failures other than not-found.
    pub async fn remove_endpoint(&self, name: &str) -> anyhow::Result<()> {
        let api: Api<DNSEndpoint> = Api::namespaced(self.client.clone(), &self.k8gb_namespace);
        info!("Removing endpoint {}/{}", self.k8gb_namespace, name);
        match api.delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(err) if is_not_found(&err) => {
                info!("Endpoint {}/{} already gone", self.k8gb_namespace, name);
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// True when the Endpoints object carries at least one ready address.
fn has_ready_addresses(endpoints: &Endpoints) -> bool {
    endpoints
        .subsets
        .as_ref()
        .is_some_and(|subsets| {
            subsets
                .iter()
                .any(|subset| subset.addresses.as_ref().is_some_and(|a| !a.is_empty()))
        })
}

/// True when a kube API error is a 404.
pub(crate) fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 404)
}

#[cfg(test)]
#[path = "assistant_tests.rs"]
mod assistant_tests;
