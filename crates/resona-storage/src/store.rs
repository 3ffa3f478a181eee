// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the ReflectionStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use resona_config::StorageConfig;
use resona_core::{
    HealthStatus, LearningTopic, MessageRecord, PatternKind, PatternRecord, PatternStatus,
    ReflectionStore, ResonaError, Role, TopicProgress, TopicWithPattern,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed reflection store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`ReflectionStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, ResonaError> {
        self.db.get().ok_or_else(|| ResonaError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl ReflectionStore for SqliteStore {
    async fn initialize(&self) -> Result<(), ResonaError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| ResonaError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), ResonaError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn health_check(&self) -> Result<HealthStatus, ResonaError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn append_message(
        &self,
        user_id: &str,
        role: Role,
        content: &str,
        context_tag: &str,
    ) -> Result<(), ResonaError> {
        queries::messages::append_message(self.db()?, user_id, role, content, context_tag).await
    }

    async fn recent_history(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<MessageRecord>, ResonaError> {
        queries::messages::recent_history(self.db()?, user_id, limit).await
    }

    async fn upsert_pattern(
        &self,
        user_id: &str,
        name: &str,
        kind: PatternKind,
        confidence: f64,
        weight: f64,
    ) -> Result<(i64, bool), ResonaError> {
        queries::patterns::upsert_pattern(self.db()?, user_id, name, kind, confidence, weight)
            .await
    }

    async fn list_patterns(
        &self,
        user_id: &str,
        kind: Option<PatternKind>,
    ) -> Result<Vec<PatternRecord>, ResonaError> {
        queries::patterns::list_patterns(self.db()?, user_id, kind).await
    }

    async fn set_pattern_status(
        &self,
        user_id: &str,
        pattern_id: i64,
        status: PatternStatus,
    ) -> Result<(), ResonaError> {
        queries::patterns::set_pattern_status(self.db()?, user_id, pattern_id, status).await
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
        queries::topics::insert_topic(
            self.db()?,
            user_id,
            pattern_id,
            title,
            content,
            hint,
            difficulty,
        )
        .await
    }

    async fn get_topic(
        &self,
        user_id: &str,
        pattern_id: i64,
    ) -> Result<Option<LearningTopic>, ResonaError> {
        queries::topics::get_topic(self.db()?, user_id, pattern_id).await
    }

    async fn list_topics(&self, user_id: &str) -> Result<Vec<TopicWithPattern>, ResonaError> {
        queries::topics::list_topics(self.db()?, user_id).await
    }

    async fn set_topic_progress(
        &self,
        user_id: &str,
        topic_id: i64,
        progress: TopicProgress,
    ) -> Result<(), ResonaError> {
        queries::topics::set_topic_progress(self.db()?, user_id, topic_id, progress).await
    }
}
