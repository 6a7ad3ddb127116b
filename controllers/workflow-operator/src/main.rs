//! Workflow Operator
//!
//! Watches WorkflowDefinition resources and keeps each one deployed at
//! its declared version, config and replica count.

use anyhow::Context;
use crds::WorkflowDefinition;
use kube::{Api, Client};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use workflow_operator::{Controller, OperatorConfig, Reconciler, Watcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // kube's rustls client needs a process-wide crypto provider
    if rustls::crypto::ring::default_provider().install_default().is_err() {
        warn!("rustls crypto provider was already installed");
    }

    info!("Starting Workflow Operator");

    let config = OperatorConfig::from_env()?;
    info!("Configuration:");
    info!("  Namespace: {}", config.watch_namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Event queue capacity: {}", config.queue_capacity);
    info!("  Watch Kubernetes: {}", config.watch_kubernetes);

    let reconciler = Arc::new(Reconciler::with_yaml_parser());
    let controller = Arc::new(Controller::with_capacity(reconciler, config.queue_capacity));
    let shutdown = CancellationToken::new();

    let controller_handle = {
        let controller = Arc::clone(&controller);
        let token = shutdown.clone();
        tokio::spawn(async move { controller.start(token).await })
    };

    let watcher_handle = if config.watch_kubernetes {
        let client = Client::try_default()
            .await
            .context("failed to create Kubernetes client")?;
        let api: Api<WorkflowDefinition> = match &config.watch_namespace {
            Some(namespace) => Api::namespaced(client, namespace),
            None => Api::all(client),
        };
        let watcher = Watcher::new(api, Arc::clone(&controller));
        let token = shutdown.child_token();
        Some(tokio::spawn(async move {
            if let Err(e) = watcher.run(token).await {
                error!("Watcher exited: {}", e);
            }
        }))
    } else {
        info!("Kubernetes watch disabled; no events will be produced");
        None
    };

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    shutdown.cancel();
    if let Some(handle) = watcher_handle {
        handle.await.context("watcher task panicked")?;
    }
    // The loop may already have exited through the shared token.
    if let Err(e) = controller.stop().await {
        info!("Controller already stopped: {}", e);
    }
    controller_handle.await.context("controller task panicked")??;

    info!("Workflow Operator stopped");
    Ok(())
}
