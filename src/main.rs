// Copyright (c) 2026 the k8gb contributors
// SPDX-License-Identifier: MIT

use anyhow::Result;
use futures::StreamExt;
use k8gb::{
    assistant::GslbAssistant,
    config::Config,
    constants::{ERROR_REQUEUE_DURATION_SECS, TOKIO_WORKER_THREADS},
    crd::Gslb,
    metrics, providers,
    reconciler::{self, Context},
};
use kube::{
    runtime::{controller::Action, watcher, Controller},
    Api, Client, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
struct ReconcileError(#[from] anyhow::Error);

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("k8gb-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

/// Initialize logging with custom format
///
/// Respects `RUST_LOG` environment variable if set, otherwise defaults to INFO level.
/// Respects `RUST_LOG_FORMAT` environment variable for output format (json or text).
fn initialize_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting k8gb operator");
}

async fn async_main() -> Result<()> {
    initialize_logging();

    let config = Arc::new(Config::from_env()?);
    info!(
        cluster_geo_tag = %config.cluster_geo_tag,
        dns_zone = %config.dns_zone,
        edge_dns_zone = %config.edge_dns_zone,
        edge_dns_type = %config.edge_dns_type,
        "Resolved operator configuration"
    );

    let client = Client::try_default().await?;
    let assistant = GslbAssistant::new(
        client.clone(),
        &config.k8gb_namespace,
        &config.edge_dns_server,
        config.overrides.fake_dns_enabled,
    );
    let provider = providers::provider_for(&config, assistant.clone())?;

    let context = Arc::new(Context {
        client: client.clone(),
        config,
        assistant,
        provider,
    });

    let gslbs: Api<Gslb> = Api::all(client);

    Controller::new(gslbs, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, context)
        .for_each(|result| async move {
            match result {
                Ok((gslb, _)) => info!("Reconciled Gslb {}/{}", gslb.namespace.unwrap_or_default(), gslb.name),
                Err(err) => warn!("Reconcile failed: {}", err),
            }
        })
        .await;

    info!("Controller terminated");
    Ok(())
}

async fn reconcile(gslb: Arc<Gslb>, ctx: Arc<Context>) -> Result<Action, ReconcileError> {
    reconciler::reconcile_gslb(&gslb, &ctx)
        .await
        .map_err(ReconcileError)
}

fn error_policy(gslb: Arc<Gslb>, err: &ReconcileError, _ctx: Arc<Context>) -> Action {
    error!(
        "Reconcile error for Gslb {}/{}: {}",
        gslb.namespace().unwrap_or_default(),
        gslb.name_any(),
        err
    );
    metrics::record_reconciliation("error", Duration::ZERO);
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}
