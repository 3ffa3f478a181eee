// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern upsert and lifecycle operations.
//!
//! Pattern identity is `(user_id, pattern_name)` with a UNIQUE constraint
//! backing it, so the upsert runs select-then-write inside one transaction.

use rusqlite::{OptionalExtension, params};

use resona_core::{PatternKind, PatternRecord, PatternStatus, ResonaError};

use crate::database::Database;
use crate::queries::parse_wire;

fn row_to_pattern(row: &rusqlite::Row<'_>) -> rusqlite::Result<PatternRecord> {
    let kind: String = row.get(3)?;
    let status: String = row.get(9)?;
    Ok(PatternRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        kind: parse_wire(3, &kind)?,
        confidence: row.get(4)?,
        weight: row.get(5)?,
        occurrence_count: row.get(6)?,
        first_seen: row.get(7)?,
        last_seen: row.get(8)?,
        status: parse_wire(9, &status)?,
    })
}

const PATTERN_COLUMNS: &str = "id, user_id, pattern_name, pattern_type, confidence_score, \
     weight, occurrences_count, first_detected, last_detected, status";

/// Insert a pattern or refresh the existing row keyed by `(user_id, name)`.
///
/// An existing row keeps its kind, status, and `first_detected`; confidence
/// and weight are overwritten, the occurrence count bumped, and
/// `last_detected` refreshed. Returns the row id and whether it was created.
pub async fn upsert_pattern(
    db: &Database,
    user_id: &str,
    name: &str,
    kind: PatternKind,
    confidence: f64,
    weight: f64,
) -> Result<(i64, bool), ResonaError> {
    let user_id = user_id.to_string();
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM patterns WHERE user_id = ?1 AND pattern_name = ?2",
                    params![user_id, name],
                    |row| row.get(0),
                )
                .optional()?;
            let result = match existing {
                Some(id) => {
                    tx.execute(
                        "UPDATE patterns
                         SET confidence_score = ?1,
                             weight = ?2,
                             occurrences_count = occurrences_count + 1,
                             last_detected = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?3",
                        params![confidence, weight, id],
                    )?;
                    (id, false)
                }
                None => {
                    tx.execute(
                        "INSERT INTO patterns
                             (user_id, pattern_name, pattern_type, confidence_score, weight)
                         VALUES (?1, ?2, ?3, ?4, ?5)",
                        params![user_id, name, kind.to_string(), confidence, weight],
                    )?;
                    (tx.last_insert_rowid(), true)
                }
            };
            tx.commit()?;
            Ok(result)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List a user's patterns, newest-detected first, optionally filtered by kind.
pub async fn list_patterns(
    db: &Database,
    user_id: &str,
    kind: Option<PatternKind>,
) -> Result<Vec<PatternRecord>, ResonaError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut patterns = Vec::new();
            match kind {
                Some(kind) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {PATTERN_COLUMNS} FROM patterns
                         WHERE user_id = ?1 AND pattern_type = ?2
                         ORDER BY last_detected DESC, id DESC"
                    ))?;
                    let rows =
                        stmt.query_map(params![user_id, kind.to_string()], row_to_pattern)?;
                    for row in rows {
                        patterns.push(row?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {PATTERN_COLUMNS} FROM patterns
                         WHERE user_id = ?1
                         ORDER BY last_detected DESC, id DESC"
                    ))?;
                    let rows = stmt.query_map(params![user_id], row_to_pattern)?;
                    for row in rows {
                        patterns.push(row?);
                    }
                }
            }
            Ok(patterns)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set a pattern's user-driven status. Errors when the row does not exist.
pub async fn set_pattern_status(
    db: &Database,
    user_id: &str,
    pattern_id: i64,
    status: PatternStatus,
) -> Result<(), ResonaError> {
    let user_id = user_id.to_string();
    let affected = db
        .connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE patterns SET status = ?1 WHERE id = ?2 AND user_id = ?3",
                params![status.to_string(), pattern_id, user_id],
            )?;
            Ok(affected)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if affected == 0 {
        return Err(ResonaError::NotFound(format!("pattern {pattern_id}")));
    }
    Ok(())
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
    async fn upsert_creates_new_pattern_with_defaults() {
        let (db, _dir) = setup_db().await;
        let (id, created) =
            upsert_pattern(&db, "u1", "self-criticism", PatternKind::Cognitive, 0.8, 0.9)
                .await
                .unwrap();
        assert!(created);
        assert!(id > 0);

        let patterns = list_patterns(&db, "u1", None).await.unwrap();
        assert_eq!(patterns.len(), 1);
        let p = &patterns[0];
        assert_eq!(p.name, "self-criticism");
        assert_eq!(p.kind, PatternKind::Cognitive);
        assert_eq!(p.occurrence_count, 1);
        assert_eq!(p.status, PatternStatus::New);
        assert_eq!(p.first_seen, p.last_seen);
    }

    #[tokio::test]
    async fn upsert_existing_bumps_count_and_overwrites_scores() {
        let (db, _dir) = setup_db().await;
        let (id1, _) =
            upsert_pattern(&db, "u1", "avoidance", PatternKind::Behavioral, 0.9, 0.8)
                .await
                .unwrap();
        let (id2, created) =
            upsert_pattern(&db, "u1", "avoidance", PatternKind::Behavioral, 0.5, 0.4)
                .await
                .unwrap();
        assert_eq!(id1, id2);
        assert!(!created);

        let p = &list_patterns(&db, "u1", None).await.unwrap()[0];
        assert_eq!(p.occurrence_count, 2);
        assert_eq!(p.confidence, 0.5);
        assert_eq!(p.weight, 0.4);
    }

    #[tokio::test]
    async fn same_name_different_users_stay_distinct() {
        let (db, _dir) = setup_db().await;
        let (id1, created1) =
            upsert_pattern(&db, "u1", "avoidance", PatternKind::Behavioral, 0.9, 0.8)
                .await
                .unwrap();
        let (id2, created2) =
            upsert_pattern(&db, "u2", "avoidance", PatternKind::Behavioral, 0.9, 0.8)
                .await
                .unwrap();
        assert!(created1 && created2);
        assert_ne!(id1, id2);
    }

    #[tokio::test]
    async fn list_patterns_filters_by_kind() {
        let (db, _dir) = setup_db().await;
        upsert_pattern(&db, "u1", "rumination", PatternKind::Cognitive, 0.8, 0.7)
            .await
            .unwrap();
        upsert_pattern(&db, "u1", "evening anxiety", PatternKind::Emotional, 0.7, 0.6)
            .await
            .unwrap();

        let cognitive = list_patterns(&db, "u1", Some(PatternKind::Cognitive))
            .await
            .unwrap();
        assert_eq!(cognitive.len(), 1);
        assert_eq!(cognitive[0].name, "rumination");

        let all = list_patterns(&db, "u1", None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn set_status_updates_row() {
        let (db, _dir) = setup_db().await;
        let (id, _) = upsert_pattern(&db, "u1", "avoidance", PatternKind::Behavioral, 0.9, 0.8)
            .await
            .unwrap();
        set_pattern_status(&db, "u1", id, PatternStatus::InProgress)
            .await
            .unwrap();
        let p = &list_patterns(&db, "u1", None).await.unwrap()[0];
        assert_eq!(p.status, PatternStatus::InProgress);
    }

    #[tokio::test]
    async fn set_status_for_wrong_user_is_not_found() {
        let (db, _dir) = setup_db().await;
        let (id, _) = upsert_pattern(&db, "u1", "avoidance", PatternKind::Behavioral, 0.9, 0.8)
            .await
            .unwrap();
        let err = set_pattern_status(&db, "u2", id, PatternStatus::Acknowledged)
            .await
            .unwrap_err();
        assert!(matches!(err, ResonaError::NotFound(_)));
    }
}
