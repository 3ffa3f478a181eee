// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the reflection API.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::cors::CorsLayer;

use resona_agent::{DiscoveryService, TurnPipeline};
use resona_core::{ReflectionStore, ResonaError};
use resona_resilience::KeyPool;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Runs one conversational turn per POST /api/reflect.
    pub pipeline: Arc<TurnPipeline>,
    /// Serves the user-driven discovery endpoints.
    pub discovery: Arc<DiscoveryService>,
    /// Store handle for the health endpoint.
    pub store: Arc<dyn ReflectionStore>,
    /// Key pool handle for the health endpoint's credential snapshot.
    pub pool: Arc<KeyPool>,
    /// Process start time for uptime reporting.
    pub start_time: std::time::Instant,
}

/// Gateway server configuration (mirrors GatewayConfig from resona-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Build the full API router over the shared state.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/api/reflect", post(handlers::post_reflect))
        .route("/api/history", get(handlers::get_history))
        .route("/api/discoveries", get(handlers::get_discoveries))
        .route(
            "/api/patterns/{id}/status",
            patch(handlers::patch_pattern_status),
        )
        .route("/api/learning-topics", get(handlers::get_learning_topics))
        .route(
            "/api/learning-topics/{id}/progress",
            patch(handlers::patch_topic_progress),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured address and serve the API until shutdown.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), ResonaError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ResonaError::Gateway {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ResonaError::Gateway {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
