// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Connector Service
//!
//! Subscribes to the subjects listed in `CONNECTORS` and dispatches every
//! message to the handler registered for its resource tag.
//!
//! Run with: cargo run --bin resource-connector
//!
//! Prerequisites:
//! 1. NATS server running (`NATS_URI`, default: nats://localhost:4222)
//! 2. Subjects to listen on (`CONNECTORS`, e.g. `network.*,instance.*`)
//!
//! Resource kinds are registered with [`PendingProvider`] handlers, which
//! answer on `<subject>.error` until a provider crate supplies real ones.

use anyhow::{Context, Result};
use cim_resource_connector::{
    ConnectorConfig, DispatchMetrics, Dispatcher, NatsClient, PendingProvider, RoutingTable,
    SubscriptionManager,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const METRICS_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting resource connector");

    let config = ConnectorConfig::from_env().context("Invalid connector configuration")?;
    info!(
        servers = ?config.nats.servers,
        connectors = ?config.connectors,
        resources = config.resources.len(),
        encrypted = config.crypto_key.is_some(),
        reply_redirection = config.reply_redirection,
        "Configuration loaded"
    );
    config
        .require_connectors()
        .context("Invalid connector configuration")?;

    let routes = RoutingTable::builder()
        .resources(config.resources.iter().copied(), PendingProvider::constructor)
        .build()
        .context("Failed to build routing table")?;

    let client = NatsClient::new(config.nats.clone())
        .await
        .context("Failed to connect to NATS")?;

    let metrics = Arc::new(DispatchMetrics::new());
    let reporter = Arc::clone(&metrics);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(METRICS_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            info!(metrics = %reporter.snapshot(), "Dispatch metrics");
        }
    });

    let dispatcher = Dispatcher::builder()
        .routes(routes)
        .transport(Arc::new(client))
        .observer(metrics)
        .crypto_key(config.crypto_key.clone())
        .reply_redirection(config.reply_redirection)
        .build()?;

    let manager = SubscriptionManager::new(Arc::new(dispatcher), config.connectors.clone());
    manager.run().await.context("Connector stopped")?;

    Ok(())
}
