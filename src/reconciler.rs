// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

//! Gslb reconciliation logic.
//!
//! One reconcile runs top-down through the engine: health oracle and local
//! inventory first, then strategy resolution, then publication of the host
//! endpoint and the zone delegation. The controller serializes reconciles
//! per Gslb key; nothing here holds mutable state across calls.

use crate::assistant::GslbAssistant;
use crate::config::Config;
use crate::constants::GSLB_FINALIZER;
use crate::crd::{Gslb, GslbStatus, HealthStatus};
use crate::metrics;
use crate::names::ns_server_names_ext;
use crate::providers::DnsProvider;
use crate::strategy::{self, EdgeDnsProber};
use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Shared context passed to the controller.
pub struct Context {
    /// Kubernetes client for API operations.
    pub client: Client,
    /// Operator configuration.
    pub config: Arc<Config>,
    /// Inventory and endpoint persistence helper.
    pub assistant: GslbAssistant,
    /// Zone publisher for the configured edge DNS backend.
    pub provider: Box<dyn DnsProvider>,
}

/// Reconcile one Gslb.
///
/// # Errors
///
/// Propagates inventory, strategy and publication failures; the controller's
/// error policy requeues them.
pub async fn reconcile_gslb(gslb: &Gslb, ctx: &Context) -> Result<Action> {
    let start = Instant::now();
    let namespace = gslb.namespace().unwrap_or_default();
    let name = gslb.name_any();

    info!("Reconciling Gslb {}/{}", namespace, name);

    if gslb.metadata.deletion_timestamp.is_some() {
        return finalize_gslb(gslb, ctx).await;
    }

    ensure_finalizer(gslb, ctx).await?;

    let service_health = ctx.assistant.service_health(gslb).await?;
    let local_targets = ctx.assistant.gslb_ingress_exposed_ips(gslb).await?;

    let prober = EdgeDnsProber::new(
        ns_server_names_ext(&ctx.config),
        ctx.config.overrides.fake_dns_enabled,
    );
    let endpoint = strategy::gslb_endpoint(
        gslb,
        &ctx.config,
        &service_health,
        &local_targets,
        &prober,
    )
    .await?;

    ctx.assistant.save_dns_endpoint(&endpoint).await?;
    ctx.provider.publish_zone_delegation(gslb).await?;

    update_status(gslb, ctx, &service_health).await?;

    metrics::record_reconciliation("success", start.elapsed());
    Ok(Action::requeue(Duration::from_secs(
        ctx.config.reconcile_requeue_seconds,
    )))
}

/// Tear down this cluster's delegation artifacts and release the finalizer.
///
/// The host endpoint is owner-referenced to the Gslb and cleaned up by the
/// ownership cascade; only the delegation needs explicit removal.
async fn finalize_gslb(gslb: &Gslb, ctx: &Context) -> Result<Action> {
    let namespace = gslb.namespace().unwrap_or_default();
    let name = gslb.name_any();

    if gslb
        .finalizers()
        .iter()
        .any(|finalizer| finalizer == GSLB_FINALIZER)
    {
        info!("Finalizing Gslb {}/{}", namespace, name);
        ctx.provider.finalize(gslb).await?;
        remove_finalizer(gslb, ctx).await?;
        info!("Successfully finalized Gslb {}/{}", namespace, name);
    }

    Ok(Action::await_change())
}

/// Add the Gslb finalizer when missing. Idempotent.
async fn ensure_finalizer(gslb: &Gslb, ctx: &Context) -> Result<()> {
    if gslb
        .finalizers()
        .iter()
        .any(|finalizer| finalizer == GSLB_FINALIZER)
    {
        return Ok(());
    }

    let namespace = gslb.namespace().unwrap_or_default();
    let name = gslb.name_any();
    info!("Adding finalizer to Gslb {}/{}", namespace, name);

    let mut finalizers = gslb.finalizers().to_vec();
    finalizers.push(GSLB_FINALIZER.to_string());

    let api: Api<Gslb> = Api::namespaced(ctx.client.clone(), &namespace);
    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;
    Ok(())
}

/// Remove the Gslb finalizer. Idempotent.
async fn remove_finalizer(gslb: &Gslb, ctx: &Context) -> Result<()> {
    let namespace = gslb.namespace().unwrap_or_default();
    let name = gslb.name_any();

    let finalizers: Vec<String> = gslb
        .finalizers()
        .iter()
        .filter(|finalizer| *finalizer != GSLB_FINALIZER)
        .cloned()
        .collect();

    let api: Api<Gslb> = Api::namespaced(ctx.client.clone(), &namespace);
    let patch = json!({ "metadata": { "finalizers": finalizers } });
    api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;
    Ok(())
}

/// Record the observed service health on the Gslb status subresource.
async fn update_status(
    gslb: &Gslb,
    ctx: &Context,
    service_health: &BTreeMap<String, HealthStatus>,
) -> Result<()> {
    let api: Api<Gslb> = Api::namespaced(ctx.client.clone(), &gslb.namespace().unwrap_or_default());
    let status = GslbStatus {
        service_health: service_health.clone(),
    };
    let patch = json!({ "status": status });
    api.patch_status(
        &gslb.name_any(),
        &PatchParams::default(),
        &Patch::Merge(&patch),
    )
    .await?;
    Ok(())
}
