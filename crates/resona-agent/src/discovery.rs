// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read and update surface over stored discoveries.
//!
//! Everything here is user-driven: listing history, browsing surfaced
//! patterns, acknowledging them, and working through learning topics.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use resona_core::{
    LearningTopic, MessageRecord, PatternKind, PatternRecord, PatternStatus, ReflectionStore,
    ResonaError, TopicProgress, TopicWithPattern,
};

/// One detected pattern joined with its learning topic, when one exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discovery {
    pub pattern: PatternRecord,
    pub topic: Option<LearningTopic>,
}

/// Thin service over the store for the discovery endpoints.
pub struct DiscoveryService {
    store: Arc<dyn ReflectionStore>,
}

impl DiscoveryService {
    pub fn new(store: Arc<dyn ReflectionStore>) -> Self {
        Self { store }
    }

    /// The most recent `limit` messages, oldest to newest.
    pub async fn conversation_history(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, ResonaError> {
        self.store.recent_history(user_id, limit).await
    }

    /// Patterns detected for the user, newest first, optionally by kind,
    /// each joined with its learning topic.
    pub async fn discoveries(
        &self,
        user_id: &str,
        kind: Option<PatternKind>,
    ) -> Result<Vec<Discovery>, ResonaError> {
        let patterns = self.store.list_patterns(user_id, kind).await?;
        let mut discoveries = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let topic = self.store.get_topic(user_id, pattern.id).await?;
            discoveries.push(Discovery { pattern, topic });
        }
        Ok(discoveries)
    }

    /// Move a pattern to a new user-driven status.
    pub async fn set_pattern_status(
        &self,
        user_id: &str,
        pattern_id: i64,
        status: PatternStatus,
    ) -> Result<(), ResonaError> {
        self.store
            .set_pattern_status(user_id, pattern_id, status)
            .await
    }

    /// Learning topics joined with their pattern, newest first.
    pub async fn learning_topics(
        &self,
        user_id: &str,
    ) -> Result<Vec<TopicWithPattern>, ResonaError> {
        self.store.list_topics(user_id).await
    }

    /// Update a topic's completion state.
    pub async fn set_topic_progress(
        &self,
        user_id: &str,
        topic_id: i64,
        progress: TopicProgress,
    ) -> Result<(), ResonaError> {
        self.store
            .set_topic_progress(user_id, topic_id, progress)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resona_core::Role;
    use resona_test_utils::MockStore;

    async fn seeded_service() -> (DiscoveryService, Arc<MockStore>) {
        let store = Arc::new(MockStore::new());
        store
            .append_message("u1", Role::User, "hello", "general")
            .await
            .unwrap();
        store
            .upsert_pattern("u1", "avoidance", PatternKind::Behavioral, 0.9, 0.8)
            .await
            .unwrap();
        (DiscoveryService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn discoveries_filter_by_kind() {
        let (service, store) = seeded_service().await;
        store
            .upsert_pattern("u1", "rumination", PatternKind::Cognitive, 0.8, 0.7)
            .await
            .unwrap();

        let behavioral = service
            .discoveries("u1", Some(PatternKind::Behavioral))
            .await
            .unwrap();
        assert_eq!(behavioral.len(), 1);
        assert_eq!(behavioral[0].pattern.name, "avoidance");

        let all = service.discoveries("u1", None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn discoveries_join_each_pattern_with_its_topic() {
        let (service, store) = seeded_service().await;
        store
            .upsert_pattern("u1", "rumination", PatternKind::Cognitive, 0.8, 0.7)
            .await
            .unwrap();
        let avoidance_id = service
            .discoveries("u1", Some(PatternKind::Behavioral))
            .await
            .unwrap()[0]
            .pattern
            .id;
        store
            .insert_topic("u1", avoidance_id, "Facing the dodge", "Body", None, "beginner")
            .await
            .unwrap();

        let all = service.discoveries("u1", None).await.unwrap();
        let avoidance = all.iter().find(|d| d.pattern.name == "avoidance").unwrap();
        let topic = avoidance.topic.as_ref().expect("topic should be joined");
        assert_eq!(topic.title, "Facing the dodge");
        let rumination = all.iter().find(|d| d.pattern.name == "rumination").unwrap();
        assert!(rumination.topic.is_none());
    }

    #[tokio::test]
    async fn pattern_status_transition_applies() {
        let (service, _store) = seeded_service().await;
        let pattern_id = service.discoveries("u1", None).await.unwrap()[0].pattern.id;
        service
            .set_pattern_status("u1", pattern_id, PatternStatus::Acknowledged)
            .await
            .unwrap();

        let updated = &service.discoveries("u1", None).await.unwrap()[0];
        assert_eq!(updated.pattern.status, PatternStatus::Acknowledged);
    }

    #[tokio::test]
    async fn unknown_pattern_status_update_is_not_found() {
        let (service, _store) = seeded_service().await;
        let err = service
            .set_pattern_status("u1", 999, PatternStatus::Explored)
            .await
            .unwrap_err();
        assert!(matches!(err, ResonaError::NotFound(_)));
    }

    #[tokio::test]
    async fn topics_round_trip_through_service() {
        let (service, store) = seeded_service().await;
        let pattern_id = service.discoveries("u1", None).await.unwrap()[0].pattern.id;
        let topic_id = store
            .insert_topic("u1", pattern_id, "Title", "Content", None, "beginner")
            .await
            .unwrap();

        let topics = service.learning_topics("u1").await.unwrap();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].pattern_name, "avoidance");

        service
            .set_topic_progress("u1", topic_id, TopicProgress::Completed)
            .await
            .unwrap();
        let topics = service.learning_topics("u1").await.unwrap();
        assert_eq!(topics[0].topic.progress, TopicProgress::Completed);
    }
}
