// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Learning topic operations.

use rusqlite::{OptionalExtension, params};

use resona_core::{LearningTopic, ResonaError, TopicProgress, TopicWithPattern};

use crate::database::Database;
use crate::queries::parse_wire;

fn row_to_topic(row: &rusqlite::Row<'_>) -> rusqlite::Result<LearningTopic> {
    let progress: String = row.get(6)?;
    Ok(LearningTopic {
        id: row.get(0)?,
        user_id: row.get(1)?,
        pattern_id: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
        hint: row.get(5)?,
        progress: parse_wire(6, &progress)?,
        difficulty: row.get(7)?,
        created_at: row.get(8)?,
        last_accessed: row.get(9)?,
    })
}

const TOPIC_COLUMNS: &str = "id, user_id, pattern_id, topic_title, topic_content, \
     interactive_hint, completion_status, difficulty_level, created_at, last_accessed";

/// Insert a learning topic for an existing pattern. Returns the new row id.
pub async fn insert_topic(
    db: &Database,
    user_id: &str,
    pattern_id: i64,
    title: &str,
    content: &str,
    hint: Option<&str>,
    difficulty: &str,
) -> Result<i64, ResonaError> {
    let user_id = user_id.to_string();
    let title = title.to_string();
    let content = content.to_string();
    let hint = hint.map(str::to_string);
    let difficulty = difficulty.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO learning_topics
                     (user_id, pattern_id, topic_title, topic_content, interactive_hint,
                      difficulty_level)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![user_id, pattern_id, title, content, hint, difficulty],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Fetch the newest topic attached to a pattern, if any.
pub async fn get_topic(
    db: &Database,
    user_id: &str,
    pattern_id: i64,
) -> Result<Option<LearningTopic>, ResonaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let topic = conn
                .query_row(
                    &format!(
                        "SELECT {TOPIC_COLUMNS} FROM learning_topics
                         WHERE user_id = ?1 AND pattern_id = ?2
                         ORDER BY id DESC LIMIT 1"
                    ),
                    params![user_id, pattern_id],
                    row_to_topic,
                )
                .optional()?;
            Ok(topic)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List a user's topics joined with pattern name and kind, newest first.
pub async fn list_topics(
    db: &Database,
    user_id: &str,
) -> Result<Vec<TopicWithPattern>, ResonaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT lt.id, lt.user_id, lt.pattern_id, lt.topic_title, lt.topic_content,
                        lt.interactive_hint, lt.completion_status, lt.difficulty_level,
                        lt.created_at, lt.last_accessed,
                        p.pattern_name, p.pattern_type
                 FROM learning_topics lt
                 JOIN patterns p ON p.id = lt.pattern_id
                 WHERE lt.user_id = ?1
                 ORDER BY lt.created_at DESC, lt.id DESC",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                let kind: String = row.get(11)?;
                Ok(TopicWithPattern {
                    topic: row_to_topic(row)?,
                    pattern_name: row.get(10)?,
                    pattern_kind: parse_wire(11, &kind)?,
                })
            })?;
            let mut topics = Vec::new();
            for row in rows {
                topics.push(row?);
            }
            Ok(topics)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Update a topic's completion status and stamp `last_accessed`.
/// Errors when the row does not exist for the user.
pub async fn set_topic_progress(
    db: &Database,
    user_id: &str,
    topic_id: i64,
    progress: TopicProgress,
) -> Result<(), ResonaError> {
    let user_id = user_id.to_string();
    let affected = db
        .connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE learning_topics
                 SET completion_status = ?1,
                     last_accessed = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2 AND user_id = ?3",
                params![progress.to_string(), topic_id, user_id],
            )?;
            Ok(affected)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if affected == 0 {
        return Err(ResonaError::NotFound(format!("topic {topic_id}")));
    }
    Ok(())
}
