// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The three model operations: reflection, pattern analysis, topic generation.
//!
//! Every operation degrades softly: an execution failure or unparseable
//! response yields `None` (or an empty detection list), never an error. The
//! pipeline decides what a missing result means for the turn.

use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use resona_core::{GenerateRequest, MessageRecord, PatternKind};
use resona_resilience::ResilientExecutor;

use crate::prompts;

/// Parsed reflection reply. Blank optional fields are normalized to `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionReply {
    pub reflection: String,
    pub insight: Option<String>,
    pub follow_up: Option<String>,
}

/// One pattern the analyzer reported, validated and clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedPattern {
    pub name: String,
    pub kind: PatternKind,
    pub confidence: f64,
    pub weight: f64,
    pub reasoning: Option<String>,
}

/// Generated micro-lesson for a freshly surfaced pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicDraft {
    pub title: String,
    pub content: String,
    pub hint: Option<String>,
}

/// Issues the model operations through the resilient executor.
pub struct ModelGateway {
    executor: Arc<ResilientExecutor>,
    model: String,
}

impl ModelGateway {
    pub fn new(executor: Arc<ResilientExecutor>, model: String) -> Self {
        Self { executor, model }
    }

    /// Empathetic reflection over the history window and the current message.
    pub async fn reflect(
        &self,
        history: &[MessageRecord],
        user_message: &str,
    ) -> Option<ReflectionReply> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompts::render_reflection(history, user_message),
            temperature: 0.7,
            max_output_tokens: Some(800),
            expect_json: true,
        };
        match self.executor.execute(&request).await {
            Ok(text) => {
                let reply = parse_reflection(&text);
                if reply.is_none() {
                    warn!("reflection response was not valid reply JSON");
                }
                reply
            }
            Err(err) => {
                warn!(error = %err, "reflection call failed");
                None
            }
        }
    }

    /// Scan the conversation window for recurring patterns.
    ///
    /// `known_patterns` are names already on record, so re-detections keep a
    /// stable name. Returns an empty list for the no-pattern sentinel, on
    /// execution failure, and on malformed output alike.
    pub async fn analyze_patterns(
        &self,
        history: &[MessageRecord],
        known_patterns: &[String],
    ) -> Vec<DetectedPattern> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompts::render_analysis(history, known_patterns),
            temperature: 0.3,
            max_output_tokens: None,
            expect_json: true,
        };
        match self.executor.execute(&request).await {
            Ok(text) => {
                if text.contains(prompts::NO_PATTERN_SENTINEL) {
                    return Vec::new();
                }
                let detections = parse_detections(&text);
                if detections.is_empty() {
                    warn!("analysis response carried no usable detections");
                }
                detections
            }
            Err(err) => {
                warn!(error = %err, "pattern analysis call failed");
                Vec::new()
            }
        }
    }

    /// Generate a beginner-level learning topic for a surfaced pattern.
    pub async fn generate_learning_topic(
        &self,
        pattern_name: &str,
        kind: PatternKind,
    ) -> Option<TopicDraft> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompts::render_topic(pattern_name, kind),
            temperature: 0.7,
            max_output_tokens: None,
            expect_json: true,
        };
        match self.executor.execute(&request).await {
            Ok(text) => {
                let draft = parse_topic(&text);
                if draft.is_none() {
                    warn!(pattern_name, "topic response was not valid draft JSON");
                }
                draft
            }
            Err(err) => {
                warn!(error = %err, pattern_name, "topic generation call failed");
                None
            }
        }
    }
}

/// Drop a Markdown code fence the model sometimes wraps JSON in.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

fn none_if_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Deserialize)]
struct RawReflection {
    reflection: String,
    #[serde(default)]
    insight: Option<String>,
    #[serde(default)]
    follow_up: Option<String>,
}

pub(crate) fn parse_reflection(text: &str) -> Option<ReflectionReply> {
    let raw: RawReflection = serde_json::from_str(strip_code_fence(text)).ok()?;
    if raw.reflection.trim().is_empty() {
        return None;
    }
    Some(ReflectionReply {
        reflection: raw.reflection,
        insight: none_if_blank(raw.insight),
        follow_up: none_if_blank(raw.follow_up),
    })
}

#[derive(Deserialize)]
struct RawDetection {
    name: String,
    kind: String,
    confidence: f64,
    weight: f64,
    #[serde(default)]
    reasoning: Option<String>,
}

pub(crate) fn parse_detections(text: &str) -> Vec<DetectedPattern> {
    let raw: Vec<RawDetection> = match serde_json::from_str(strip_code_fence(text)) {
        Ok(raw) => raw,
        Err(_) => return Vec::new(),
    };
    raw.into_iter()
        .filter_map(|d| {
            if d.name.trim().is_empty() {
                return None;
            }
            let Ok(kind) = PatternKind::from_str(d.kind.trim()) else {
                warn!(kind = %d.kind, "analyzer reported an unknown pattern kind");
                return None;
            };
            Some(DetectedPattern {
                name: d.name.trim().to_lowercase(),
                kind,
                confidence: d.confidence.clamp(0.0, 1.0),
                weight: d.weight.clamp(0.0, 1.0),
                reasoning: none_if_blank(d.reasoning),
            })
        })
        .collect()
}

#[derive(Deserialize)]
struct RawTopic {
    title: String,
    content: String,
    #[serde(default)]
    hint: Option<String>,
}

pub(crate) fn parse_topic(text: &str) -> Option<TopicDraft> {
    let raw: RawTopic = serde_json::from_str(strip_code_fence(text)).ok()?;
    if raw.title.trim().is_empty() || raw.content.trim().is_empty() {
        return None;
    }
    Some(TopicDraft {
        title: raw.title,
        content: raw.content,
        hint: none_if_blank(raw.hint),
    })
}
