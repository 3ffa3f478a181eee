// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the reflection REST API.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use resona_core::{
    HealthStatus, MessageRecord, PatternKind, PatternStatus, ResonaError, TopicProgress,
    TopicWithPattern,
};

use resona_agent::{Discovery, TurnOutcome};

use crate::server::GatewayState;

/// Identity used when a request does not name a user.
const DEFAULT_USER: &str = "default_user";
const DEFAULT_CONTEXT_TAG: &str = "general";
const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Request body for POST /api/reflect.
#[derive(Debug, Deserialize)]
pub struct ReflectRequest {
    /// The user's message for this turn.
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub context_tag: Option<String>,
}

/// Pattern surfaced in a reflect response.
#[derive(Debug, Serialize)]
pub struct NewPatternBody {
    pub id: i64,
    pub name: String,
    pub kind: PatternKind,
}

/// Response body for POST /api/reflect.
#[derive(Debug, Serialize)]
pub struct ReflectResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_pattern: Option<NewPatternBody>,
    /// True when the model could not produce a reflection this turn.
    pub degraded: bool,
    /// Machine-readable discriminant, `"ai_unavailable"` on a degraded turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(err: ResonaError) -> Response {
    let status = match err {
        ResonaError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// POST /api/reflect -- run one conversational turn.
pub async fn post_reflect(
    State(state): State<GatewayState>,
    Json(body): Json<ReflectRequest>,
) -> Response {
    if body.message.trim().is_empty() {
        return bad_request("message must not be empty");
    }
    let user_id = body.user_id.as_deref().unwrap_or(DEFAULT_USER);
    let context_tag = body.context_tag.as_deref().unwrap_or(DEFAULT_CONTEXT_TAG);

    match state
        .pipeline
        .handle_turn(user_id, &body.message, context_tag)
        .await
    {
        Ok(TurnOutcome::Reflection(reply)) => (
            StatusCode::OK,
            Json(ReflectResponse {
                message: reply.message,
                suggestion: reply.suggestion,
                follow_up: reply.follow_up,
                new_pattern: reply.new_pattern.map(|p| NewPatternBody {
                    id: p.id,
                    name: p.name,
                    kind: p.kind,
                }),
                degraded: false,
                error: None,
            }),
        )
            .into_response(),
        Ok(TurnOutcome::Degraded { message }) => (
            StatusCode::OK,
            Json(ReflectResponse {
                message,
                suggestion: None,
                follow_up: None,
                new_pattern: None,
                degraded: true,
                error: Some("ai_unavailable".to_string()),
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

/// Query parameters for GET /api/history.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Response body for GET /api/history.
#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<MessageRecord>,
}

/// GET /api/history -- recent conversation, oldest to newest.
pub async fn get_history(
    State(state): State<GatewayState>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let user_id = query.user_id.as_deref().unwrap_or(DEFAULT_USER);
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if limit < 1 {
        return bad_request("limit must be positive");
    }
    match state.discovery.conversation_history(user_id, limit).await {
        Ok(messages) => (StatusCode::OK, Json(HistoryResponse { messages })).into_response(),
        Err(err) => error_response(err),
    }
}

/// Query parameters for GET /api/discoveries.
#[derive(Debug, Deserialize)]
pub struct DiscoveriesQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    /// Optional kind filter: emotional, cognitive, or behavioral.
    #[serde(default)]
    pub kind: Option<PatternKind>,
}

/// Response body for GET /api/discoveries.
#[derive(Debug, Serialize)]
pub struct DiscoveriesResponse {
    pub discoveries: Vec<Discovery>,
}

/// GET /api/discoveries -- surfaced patterns joined with their topics,
/// newest-detected first.
pub async fn get_discoveries(
    State(state): State<GatewayState>,
    Query(query): Query<DiscoveriesQuery>,
) -> Response {
    let user_id = query.user_id.as_deref().unwrap_or(DEFAULT_USER);
    match state.discovery.discoveries(user_id, query.kind).await {
        Ok(discoveries) => {
            (StatusCode::OK, Json(DiscoveriesResponse { discoveries })).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// Request body for PATCH /api/patterns/{id}/status.
#[derive(Debug, Deserialize)]
pub struct PatternStatusRequest {
    pub status: PatternStatus,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// PATCH /api/patterns/{id}/status -- user-driven lifecycle transition.
pub async fn patch_pattern_status(
    State(state): State<GatewayState>,
    Path(pattern_id): Path<i64>,
    Json(body): Json<PatternStatusRequest>,
) -> Response {
    let user_id = body.user_id.as_deref().unwrap_or(DEFAULT_USER);
    match state
        .discovery
        .set_pattern_status(user_id, pattern_id, body.status)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

/// Query parameters for GET /api/learning-topics.
#[derive(Debug, Deserialize)]
pub struct TopicsQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Response body for GET /api/learning-topics.
#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    pub topics: Vec<TopicWithPattern>,
}

/// GET /api/learning-topics -- generated topics joined with their patterns.
pub async fn get_learning_topics(
    State(state): State<GatewayState>,
    Query(query): Query<TopicsQuery>,
) -> Response {
    let user_id = query.user_id.as_deref().unwrap_or(DEFAULT_USER);
    match state.discovery.learning_topics(user_id).await {
        Ok(topics) => (StatusCode::OK, Json(TopicsResponse { topics })).into_response(),
        Err(err) => error_response(err),
    }
}

/// Request body for PATCH /api/learning-topics/{id}/progress.
#[derive(Debug, Deserialize)]
pub struct TopicProgressRequest {
    pub progress: TopicProgress,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// PATCH /api/learning-topics/{id}/progress -- completion state update.
pub async fn patch_topic_progress(
    State(state): State<GatewayState>,
    Path(topic_id): Path<i64>,
    Json(body): Json<TopicProgressRequest>,
) -> Response {
    let user_id = body.user_id.as_deref().unwrap_or(DEFAULT_USER);
    match state
        .discovery
        .set_topic_progress(user_id, topic_id, body.progress)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

/// One pool entry in the health response, key already masked.
#[derive(Debug, Serialize)]
pub struct KeyStatusBody {
    pub key: String,
    pub health: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub api_keys: Vec<KeyStatusBody>,
}

/// GET /health -- storage-backed liveness probe plus a key pool snapshot.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let uptime_secs = state.start_time.elapsed().as_secs();
    let api_keys = state
        .pool
        .statuses()
        .into_iter()
        .map(|s| KeyStatusBody {
            key: s.key,
            health: s.health.label().to_string(),
        })
        .collect();
    match state.store.health_check().await {
        Ok(HealthStatus::Healthy) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                uptime_secs,
                api_keys,
            }),
        )
            .into_response(),
        Ok(HealthStatus::Degraded(detail)) | Ok(HealthStatus::Unhealthy(detail)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: detail,
                version: env!("CARGO_PKG_VERSION").to_string(),
                uptime_secs,
                api_keys,
            }),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}
