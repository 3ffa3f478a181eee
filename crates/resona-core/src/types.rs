// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Resona workspace.
//!
//! Wire strings (role names, pattern statuses, topic progress values) follow
//! the database schema, so enum `Display`/`FromStr` output is what lands in
//! SQLite and in JSON responses.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Author of a conversation message.
///
/// The assistant role is stored as `ai` in the messages table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum Role {
    #[strum(serialize = "user")]
    #[serde(rename = "user")]
    User,
    #[strum(serialize = "ai")]
    #[serde(rename = "ai")]
    Assistant,
}

/// Category of a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    Emotional,
    Cognitive,
    Behavioral,
}

/// User-driven lifecycle status of a pattern.
///
/// The pipeline only ever creates patterns as `New`; all other transitions
/// come from explicit user actions through the discovery surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum PatternStatus {
    #[strum(serialize = "new")]
    #[serde(rename = "new")]
    New,
    #[strum(serialize = "acknowledged")]
    #[serde(rename = "acknowledged")]
    Acknowledged,
    #[strum(serialize = "working_on_it")]
    #[serde(rename = "working_on_it")]
    InProgress,
    #[strum(serialize = "explored")]
    #[serde(rename = "explored")]
    Explored,
}

/// Completion state of a learning topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TopicProgress {
    Unread,
    InProgress,
    Completed,
}

/// A single stored conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: i64,
    pub user_id: String,
    pub role: Role,
    pub content: String,
    pub context_tag: String,
    pub created_at: String,
}

/// A recurring emotional/cognitive/behavioral pattern detected for a user.
///
/// Identity is `(user_id, name)` -- a textual match, not a semantic one.
/// Two differently-worded but equivalent patterns stay distinct rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRecord {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub kind: PatternKind,
    pub confidence: f64,
    pub weight: f64,
    pub occurrence_count: i64,
    pub first_seen: String,
    pub last_seen: String,
    pub status: PatternStatus,
}

/// An AI-generated learning topic attached to a pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningTopic {
    pub id: i64,
    pub user_id: String,
    pub pattern_id: i64,
    pub title: String,
    pub content: String,
    pub hint: Option<String>,
    pub progress: TopicProgress,
    pub difficulty: String,
    pub created_at: String,
    pub last_accessed: Option<String>,
}

/// A learning topic joined with its pattern's name and kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicWithPattern {
    #[serde(flatten)]
    pub topic: LearningTopic,
    pub pattern_name: String,
    pub pattern_kind: PatternKind,
}

/// One logical generation request against the remote model service.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Model identifier, e.g. `gemini-1.5-flash`.
    pub model: String,
    /// Fully rendered prompt text (system prompt + history + user turn).
    pub prompt: String,
    pub temperature: f64,
    pub max_output_tokens: Option<u32>,
    /// Ask the service for `application/json` output.
    pub expect_json: bool,
}

/// Response from the remote model service.
///
/// `text` is `None` when the service answered without usable text
/// (empty candidate list, safety block, etc.) -- received but unusable.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateResponse {
    pub text: Option<String>,
}

/// Health status reported by component health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_wire_strings_match_schema() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "ai");
        assert_eq!(Role::from_str("ai").unwrap(), Role::Assistant);
    }

    #[test]
    fn pattern_status_round_trips() {
        for status in [
            PatternStatus::New,
            PatternStatus::Acknowledged,
            PatternStatus::InProgress,
            PatternStatus::Explored,
        ] {
            let s = status.to_string();
            assert_eq!(PatternStatus::from_str(&s).unwrap(), status);
        }
        assert_eq!(PatternStatus::InProgress.to_string(), "working_on_it");
    }

    #[test]
    fn pattern_kind_serde_is_lowercase() {
        let json = serde_json::to_string(&PatternKind::Emotional).unwrap();
        assert_eq!(json, "\"emotional\"");
        let parsed: PatternKind = serde_json::from_str("\"behavioral\"").unwrap();
        assert_eq!(parsed, PatternKind::Behavioral);
    }

    #[test]
    fn topic_progress_wire_strings() {
        assert_eq!(TopicProgress::Unread.to_string(), "unread");
        assert_eq!(TopicProgress::InProgress.to_string(), "in_progress");
        assert_eq!(TopicProgress::Completed.to_string(), "completed");
    }

    #[test]
    fn topic_with_pattern_flattens_topic_fields() {
        let joined = TopicWithPattern {
            topic: LearningTopic {
                id: 1,
                user_id: "u1".into(),
                pattern_id: 2,
                title: "t".into(),
                content: "c".into(),
                hint: None,
                progress: TopicProgress::Unread,
                difficulty: "beginner".into(),
                created_at: "2026-01-01T00:00:00Z".into(),
                last_accessed: None,
            },
            pattern_name: "self-criticism".into(),
            pattern_kind: PatternKind::Cognitive,
        };
        let json = serde_json::to_string(&joined).unwrap();
        assert!(json.contains("\"title\":\"t\""));
        assert!(json.contains("\"pattern_name\":\"self-criticism\""));
    }
}
