// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `resona serve` command implementation.
//!
//! Wires the full stack by hand: SQLite store, key pool, Gemini client,
//! resilient executor, turn pipeline, discovery service, HTTP gateway.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use resona_agent::{DiscoveryService, ModelGateway, TurnPipeline};
use resona_config::ResonaConfig;
use resona_core::{ReflectionStore, ResonaError};
use resona_gateway::{GatewayState, ServerConfig, start_server};
use resona_gemini::GeminiClient;
use resona_resilience::{KeyPool, ResilientExecutor};
use resona_storage::SqliteStore;

/// Run the `resona serve` command until shutdown.
pub async fn run_serve(config: ResonaConfig) -> Result<(), ResonaError> {
    init_tracing(&config.agent.log_level);

    info!("starting resona serve");

    if config.gemini.api_keys.is_empty() {
        warn!("no Gemini API keys configured; every turn will degrade until keys are added");
    }

    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;

    let pool = Arc::new(KeyPool::new(
        config.gemini.api_keys.clone(),
        Duration::from_secs(config.gemini.cooldown_secs),
    ));
    let client = Arc::new(GeminiClient::new()?);
    let executor = Arc::new(ResilientExecutor::new(
        pool.clone(),
        client,
        config.gemini.max_attempts,
    ));
    let gateway = ModelGateway::new(executor, config.gemini.model.clone());

    let state = GatewayState {
        pipeline: Arc::new(TurnPipeline::new(store.clone(), gateway)),
        discovery: Arc::new(DiscoveryService::new(store.clone())),
        store: store.clone(),
        pool,
        start_time: std::time::Instant::now(),
    };

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    tokio::select! {
        result = start_server(&server_config, state) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    store.close().await?;
    info!("resona stopped");
    Ok(())
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("resona={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
