// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementation of `ReflectionStore` for tests.

use async_trait::async_trait;
use tokio::sync::Mutex;

use resona_core::{
    HealthStatus, LearningTopic, MessageRecord, PatternKind, PatternRecord, PatternStatus,
    ReflectionStore, ResonaError, Role, TopicProgress, TopicWithPattern,
};

#[derive(Default)]
struct MockState {
    messages: Vec<MessageRecord>,
    patterns: Vec<PatternRecord>,
    topics: Vec<LearningTopic>,
    next_id: i64,
}

impl MockState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// An in-memory store with the same observable behavior as the SQLite
/// implementation, for pipeline and gateway tests.
#[derive(Default)]
pub struct MockStore {
    state: Mutex<MockState>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all stored messages for assertions.
    pub async fn messages(&self) -> Vec<MessageRecord> {
        self.state.lock().await.messages.clone()
    }

    /// Returns all stored patterns for assertions.
    pub async fn patterns(&self) -> Vec<PatternRecord> {
        self.state.lock().await.patterns.clone()
    }

    /// Returns all stored topics for assertions.
    pub async fn topics(&self) -> Vec<LearningTopic> {
        self.state.lock().await.topics.clone()
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[async_trait]
impl ReflectionStore for MockStore {
    async fn initialize(&self) -> Result<(), ResonaError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), ResonaError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<HealthStatus, ResonaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn append_message(
        &self,
        user_id: &str,
        role: Role,
        content: &str,
        context_tag: &str,
    ) -> Result<(), ResonaError> {
        let mut state = self.state.lock().await;
        let id = state.allocate_id();
        state.messages.push(MessageRecord {
            id,
            user_id: user_id.to_string(),
            role,
            content: content.to_string(),
            context_tag: context_tag.to_string(),
            created_at: now(),
        });
        Ok(())
    }

    async fn recent_history(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, ResonaError> {
        let state = self.state.lock().await;
        let mut recent: Vec<MessageRecord> = state
            .messages
            .iter()
            .filter(|m| m.user_id == user_id)
            .rev()
            .take(limit as usize)
            .cloned()
            .collect();
        recent.reverse();
        Ok(recent)
    }

    async fn upsert_pattern(
        &self,
        user_id: &str,
        name: &str,
        kind: PatternKind,
        confidence: f64,
        weight: f64,
    ) -> Result<(i64, bool), ResonaError> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state
            .patterns
            .iter_mut()
            .find(|p| p.user_id == user_id && p.name == name)
        {
            existing.occurrence_count += 1;
            existing.confidence = confidence;
            existing.weight = weight;
            existing.last_seen = now();
            return Ok((existing.id, false));
        }
        let id = state.allocate_id();
        state.patterns.push(PatternRecord {
            id,
            user_id: user_id.to_string(),
            name: name.to_string(),
            kind,
            confidence,
            weight,
            occurrence_count: 1,
            first_seen: now(),
            last_seen: now(),
            status: PatternStatus::New,
        });
        Ok((id, true))
    }

    async fn list_patterns(
        &self,
        user_id: &str,
        kind: Option<PatternKind>,
    ) -> Result<Vec<PatternRecord>, ResonaError> {
        let state = self.state.lock().await;
        let mut patterns: Vec<PatternRecord> = state
            .patterns
            .iter()
            .filter(|p| p.user_id == user_id && kind.is_none_or(|k| p.kind == k))
            .cloned()
            .collect();
        patterns.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));
        Ok(patterns)
    }

    async fn set_pattern_status(
        &self,
        user_id: &str,
        pattern_id: i64,
        status: PatternStatus,
    ) -> Result<(), ResonaError> {
        let mut state = self.state.lock().await;
        let pattern = state
            .patterns
            .iter_mut()
            .find(|p| p.user_id == user_id && p.id == pattern_id)
            .ok_or_else(|| ResonaError::NotFound(format!("pattern {pattern_id}")))?;
        pattern.status = status;
        Ok(())
    }

    async fn insert_topic(
        &self,
        user_id: &str,
        pattern_id: i64,
        title: &str,
        content: &str,
        hint: Option<&str>,
        difficulty: &str,
    ) -> Result<i64, ResonaError> {
        let mut state = self.state.lock().await;
        let id = state.allocate_id();
        state.topics.push(LearningTopic {
            id,
            user_id: user_id.to_string(),
            pattern_id,
            title: title.to_string(),
            content: content.to_string(),
            hint: hint.map(str::to_string),
            progress: TopicProgress::Unread,
            difficulty: difficulty.to_string(),
            created_at: now(),
            last_accessed: None,
        });
        Ok(id)
    }

    async fn get_topic(
        &self,
        user_id: &str,
        pattern_id: i64,
    ) -> Result<Option<LearningTopic>, ResonaError> {
        let state = self.state.lock().await;
        Ok(state
            .topics
            .iter()
            .find(|t| t.user_id == user_id && t.pattern_id == pattern_id)
            .cloned())
    }

    async fn list_topics(&self, user_id: &str) -> Result<Vec<TopicWithPattern>, ResonaError> {
        let state = self.state.lock().await;
        let mut joined: Vec<TopicWithPattern> = state
            .topics
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter_map(|t| {
                state
                    .patterns
                    .iter()
                    .find(|p| p.id == t.pattern_id)
                    .map(|p| TopicWithPattern {
                        topic: t.clone(),
                        pattern_name: p.name.clone(),
                        pattern_kind: p.kind,
                    })
            })
            .collect();
        joined.sort_by(|a, b| b.topic.created_at.cmp(&a.topic.created_at));
        Ok(joined)
    }

    async fn set_topic_progress(
        &self,
        user_id: &str,
        topic_id: i64,
        progress: TopicProgress,
    ) -> Result<(), ResonaError> {
        let mut state = self.state.lock().await;
        let topic = state
            .topics
            .iter_mut()
            .find(|t| t.user_id == user_id && t.id == topic_id)
            .ok_or_else(|| ResonaError::NotFound(format!("topic {topic_id}")))?;
        topic.progress = progress;
        topic.last_accessed = Some(now());
        Ok(())
    }
}
