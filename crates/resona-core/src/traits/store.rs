// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence trait for conversation history, patterns, and learning topics.

use async_trait::async_trait;

use crate::error::ResonaError;
use crate::types::{
    HealthStatus, LearningTopic, MessageRecord, PatternKind, PatternRecord, PatternStatus, Role,
    TopicProgress, TopicWithPattern,
};

/// Persistence interface consumed by the turn pipeline and discovery surface.
///
/// Implementations must make `upsert_pattern` atomic: it is a true
/// read-modify-write and the pipeline may run concurrently for the same user.
#[async_trait]
pub trait ReflectionStore: Send + Sync + 'static {
    /// Opens the backend and runs any pending migrations.
    async fn initialize(&self) -> Result<(), ResonaError>;

    /// Flushes pending writes and releases connections.
    async fn close(&self) -> Result<(), ResonaError>;

    /// Reports whether the backend is reachable.
    async fn health_check(&self) -> Result<HealthStatus, ResonaError>;

    /// Appends one message to the user's conversation history.
    async fn append_message(
        &self,
        user_id: &str,
        role: Role,
        content: &str,
        context_tag: &str,
    ) -> Result<(), ResonaError>;

    /// Returns the most recent `limit` messages, oldest to newest.
    async fn recent_history(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, ResonaError>;

    /// Inserts a pattern or updates the existing row keyed by `(user_id, name)`.
    ///
    /// An existing row gets `occurrences_count + 1`, its confidence and weight
    /// overwritten, and `last_detected` refreshed. Returns the row id and
    /// whether the row was newly created.
    async fn upsert_pattern(
        &self,
        user_id: &str,
        name: &str,
        kind: PatternKind,
        confidence: f64,
        weight: f64,
    ) -> Result<(i64, bool), ResonaError>;

    /// Lists a user's patterns, newest-detected first, optionally by kind.
    async fn list_patterns(
        &self,
        user_id: &str,
        kind: Option<PatternKind>,
    ) -> Result<Vec<PatternRecord>, ResonaError>;

    /// Sets a pattern's user-driven status.
    ///
    /// Returns [`ResonaError::NotFound`] when no such pattern exists for the user.
    async fn set_pattern_status(
        &self,
        user_id: &str,
        pattern_id: i64,
        status: PatternStatus,
    ) -> Result<(), ResonaError>;

    /// Inserts a learning topic referencing an existing pattern row.
    async fn insert_topic(
        &self,
        user_id: &str,
        pattern_id: i64,
        title: &str,
        content: &str,
        hint: Option<&str>,
        difficulty: &str,
    ) -> Result<i64, ResonaError>;

    /// Fetches the learning topic attached to a pattern, if any.
    async fn get_topic(
        &self,
        user_id: &str,
        pattern_id: i64,
    ) -> Result<Option<LearningTopic>, ResonaError>;

    /// Lists a user's topics joined with pattern name/kind, newest first.
    async fn list_topics(&self, user_id: &str) -> Result<Vec<TopicWithPattern>, ResonaError>;

    /// Updates a topic's completion status and refreshes `last_accessed`.
    ///
    /// Returns [`ResonaError::NotFound`] when no such topic exists for the user.
    async fn set_topic_progress(
        &self,
        user_id: &str,
        topic_id: i64,
        progress: TopicProgress,
    ) -> Result<(), ResonaError>;
}
