// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation message operations.

use rusqlite::params;

use resona_core::{MessageRecord, ResonaError, Role};

use crate::database::Database;
use crate::queries::parse_wire;

/// Append one message to a user's history. Timestamp comes from the schema default.
pub async fn append_message(
    db: &Database,
    user_id: &str,
    role: Role,
    content: &str,
    context_tag: &str,
) -> Result<(), ResonaError> {
    let user_id = user_id.to_string();
    let content = content.to_string();
    let context_tag = context_tag.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (user_id, role, content, context_tag)
                 VALUES (?1, ?2, ?3, ?4)",
                params![user_id, role.to_string(), content, context_tag],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recent `limit` messages for a user, oldest to newest.
pub async fn recent_history(
    db: &Database,
    user_id: &str,
    limit: i64,
) -> Result<Vec<MessageRecord>, ResonaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, role, content, context_tag, created_at
                 FROM messages WHERE user_id = ?1
                 ORDER BY id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![user_id, limit], |row| {
                let role: String = row.get(2)?;
                Ok(MessageRecord {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    role: parse_wire(2, &role)?,
                    content: row.get(3)?,
                    context_tag: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            // The LIMIT walks backwards from the newest row; callers want
            // chronological order for prompt building.
            messages.reverse();
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn append_and_read_back() {
        let (db, _dir) = setup_db().await;
        append_message(&db, "u1", Role::User, "hello", "general")
            .await
            .unwrap();
        append_message(&db, "u1", Role::Assistant, "hi there", "general")
            .await
            .unwrap();

        let history = recent_history(&db, "u1", 10).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "hello");
        assert_eq!(history[1].role, Role::Assistant);
        assert!(!history[1].created_at.is_empty());
    }

    #[tokio::test]
    async fn recent_history_trims_to_limit_keeping_newest() {
        let (db, _dir) = setup_db().await;
        for i in 0..6 {
            append_message(&db, "u1", Role::User, &format!("msg {i}"), "general")
                .await
                .unwrap();
        }
        let history = recent_history(&db, "u1", 4).await.unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content, "msg 2");
        assert_eq!(history[3].content, "msg 5");
    }

    #[tokio::test]
    async fn history_is_scoped_per_user() {
        let (db, _dir) = setup_db().await;
        append_message(&db, "u1", Role::User, "mine", "general")
            .await
            .unwrap();
        append_message(&db, "u2", Role::User, "theirs", "general")
            .await
            .unwrap();

        let history = recent_history(&db, "u1", 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "mine");
    }
}
