// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `resona status` command implementation.
//!
//! Connects to the gateway health endpoint to display server state, uptime,
//! and per-key pool health. Falls back to a local config summary when the
//! server is not running.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use resona_config::ResonaConfig;
use resona_core::ResonaError;
use resona_resilience::KeyPool;

/// One API key entry, masked, with its health label.
#[derive(Debug, Serialize, Deserialize)]
struct KeyStatusBody {
    key: String,
    health: String,
}

/// Health endpoint response from the gateway.
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    uptime_secs: u64,
    #[serde(default)]
    api_keys: Vec<KeyStatusBody>,
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
struct StatusResponse {
    running: bool,
    status: String,
    uptime_secs: Option<u64>,
    uptime_human: Option<String>,
    gateway_host: String,
    gateway_port: u16,
    model: String,
    database_path: String,
    api_keys: Vec<KeyStatusBody>,
}

/// Format seconds into a human-readable duration string.
fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Masked snapshot of the keys the config would put into rotation.
fn configured_keys(config: &ResonaConfig) -> Vec<KeyStatusBody> {
    let pool = KeyPool::new(
        config.gemini.api_keys.clone(),
        Duration::from_secs(config.gemini.cooldown_secs),
    );
    pool.statuses()
        .into_iter()
        .map(|s| KeyStatusBody {
            key: s.key,
            health: s.health.label().to_string(),
        })
        .collect()
}

/// Run the `resona status` command against the configured gateway address.
pub async fn run_status(config: &ResonaConfig, json: bool) -> Result<(), ResonaError> {
    let host = &config.gateway.host;
    let port = config.gateway.port;
    let url = format!("http://{host}:{port}/health");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| ResonaError::Internal(format!("failed to create HTTP client: {e}")))?;

    let response = match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            let health: HealthResponse = resp.json().await.map_err(|e| {
                ResonaError::Internal(format!("failed to parse health response: {e}"))
            })?;
            StatusResponse {
                running: true,
                status: health.status,
                uptime_secs: Some(health.uptime_secs),
                uptime_human: Some(format_uptime(health.uptime_secs)),
                gateway_host: host.clone(),
                gateway_port: port,
                model: config.gemini.model.clone(),
                database_path: config.storage.database_path.clone(),
                // Live pool state straight from the running server.
                api_keys: health.api_keys,
            }
        }
        _ => StatusResponse {
            running: false,
            status: "not running".to_string(),
            uptime_secs: None,
            uptime_human: None,
            gateway_host: host.clone(),
            gateway_port: port,
            model: config.gemini.model.clone(),
            database_path: config.storage.database_path.clone(),
            // The server is down, so show what the config would load.
            api_keys: configured_keys(config),
        },
    };

    if json {
        let rendered = serde_json::to_string_pretty(&response)
            .map_err(|e| ResonaError::Internal(format!("failed to render status: {e}")))?;
        println!("{rendered}");
    } else {
        if response.running {
            println!("resona is running at {host}:{port}");
            println!("  status: {}", response.status);
            if let Some(uptime) = &response.uptime_human {
                println!("  uptime: {uptime}");
            }
        } else {
            println!("resona is not running at {host}:{port}");
        }
        println!("  model: {}", response.model);
        println!("  database: {}", response.database_path);
        println!("  api keys: {}", response.api_keys.len());
        for key in &response.api_keys {
            println!("    {} {}", key.key, key.health);
        }
    }

    Ok(())
}
