// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The conversational turn pipeline.
//!
//! One turn is: persist the user message, reflect, persist the reply, then
//! analyze for patterns and maybe attach a learning topic. Persistence
//! failures abort the turn; model failures degrade it. Pattern work never
//! takes the reply away from the user.

use std::sync::Arc;

use tracing::{info, warn};

use resona_core::{PatternKind, ReflectionStore, ResonaError, Role};

use crate::ops::{DetectedPattern, ModelGateway};

/// How many recent messages feed the reflection and analysis prompts.
pub const HISTORY_WINDOW: i64 = 8;

/// Both gates a detection must clear before it surfaces to the user.
const CONFIDENCE_GATE: f64 = 0.7;
const WEIGHT_GATE: f64 = 0.7;

const DEGRADED_MESSAGE: &str = "I'm having trouble gathering my thoughts right now. \
Your words are saved, and I'll be here when you want to try again in a little while.";

/// Reference to a pattern surfaced during this turn.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternHandle {
    pub id: i64,
    pub name: String,
    pub kind: PatternKind,
}

/// A completed reflective turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    /// The empathetic reflection text.
    pub message: String,
    /// Optional gentle observation.
    pub suggestion: Option<String>,
    /// Optional open question inviting the user deeper.
    pub follow_up: Option<String>,
    /// A newly discovered pattern that cleared both gates, if any.
    pub new_pattern: Option<PatternHandle>,
}

/// Result of one turn: a full reflection, or a degraded canned reply when
/// the model could not produce one.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Reflection(TurnReply),
    Degraded { message: String },
}

/// Orchestrates one conversational turn end to end.
pub struct TurnPipeline {
    store: Arc<dyn ReflectionStore>,
    gateway: ModelGateway,
}

impl TurnPipeline {
    pub fn new(store: Arc<dyn ReflectionStore>, gateway: ModelGateway) -> Self {
        Self { store, gateway }
    }

    /// Run one turn for `user_id`.
    ///
    /// Storage failures on the user's own message are fatal -- losing the
    /// message would silently corrupt the history the next turns build on.
    pub async fn handle_turn(
        &self,
        user_id: &str,
        message: &str,
        context_tag: &str,
    ) -> Result<TurnOutcome, ResonaError> {
        let history = self.store.recent_history(user_id, HISTORY_WINDOW).await?;
        self.store
            .append_message(user_id, Role::User, message, context_tag)
            .await?;

        let Some(reply) = self.gateway.reflect(&history, message).await else {
            info!(user_id, "turn degraded: no reflection produced");
            return Ok(TurnOutcome::Degraded {
                message: DEGRADED_MESSAGE.to_string(),
            });
        };

        let stored_reply = [
            Some(reply.reflection.as_str()),
            reply.insight.as_deref(),
            reply.follow_up.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n\n");
        self.store
            .append_message(user_id, Role::Assistant, &stored_reply, context_tag)
            .await?;

        let new_pattern = self.detect_and_record(user_id).await;

        Ok(TurnOutcome::Reflection(TurnReply {
            message: reply.reflection,
            suggestion: reply.insight,
            follow_up: reply.follow_up,
            new_pattern,
        }))
    }

    /// Analyze the refreshed window, record every detection, and surface at
    /// most one newly created pattern that clears both gates.
    ///
    /// Everything in here is best-effort: the reflection already succeeded,
    /// so failures only log.
    async fn detect_and_record(&self, user_id: &str) -> Option<PatternHandle> {
        let window = match self.store.recent_history(user_id, HISTORY_WINDOW).await {
            Ok(window) => window,
            Err(err) => {
                warn!(error = %err, "skipping analysis: history fetch failed");
                return None;
            }
        };

        // Known `name (status)` summaries keep re-detections textually stable;
        // losing them only risks a duplicate name, so the fetch is best-effort.
        let known_patterns = match self.store.list_patterns(user_id, None).await {
            Ok(patterns) => patterns
                .into_iter()
                .map(|p| format!("{} ({})", p.name, p.status))
                .collect::<Vec<_>>(),
            Err(err) => {
                warn!(error = %err, "analyzing without known pattern names");
                Vec::new()
            }
        };

        let detections = self.gateway.analyze_patterns(&window, &known_patterns).await;
        let mut surfaced: Option<PatternHandle> = None;

        for detection in &detections {
            let (pattern_id, created) = match self
                .store
                .upsert_pattern(
                    user_id,
                    &detection.name,
                    detection.kind,
                    detection.confidence,
                    detection.weight,
                )
                .await
            {
                Ok(result) => result,
                Err(err) => {
                    warn!(error = %err, name = %detection.name, "pattern upsert failed");
                    continue;
                }
            };

            if surfaced.is_none() && created && clears_gates(detection) {
                info!(user_id, name = %detection.name, "new pattern surfaced");
                self.attach_topic(user_id, pattern_id, detection).await;
                surfaced = Some(PatternHandle {
                    id: pattern_id,
                    name: detection.name.clone(),
                    kind: detection.kind,
                });
            }
        }

        surfaced
    }

    /// Generate and store a learning topic for a surfaced pattern.
    /// A failure here still leaves the pattern surfaced.
    async fn attach_topic(&self, user_id: &str, pattern_id: i64, detection: &DetectedPattern) {
        let Some(draft) = self
            .gateway
            .generate_learning_topic(&detection.name, detection.kind)
            .await
        else {
            return;
        };
        if let Err(err) = self
            .store
            .insert_topic(
                user_id,
                pattern_id,
                &draft.title,
                &draft.content,
                draft.hint.as_deref(),
                "beginner",
            )
            .await
        {
            warn!(error = %err, pattern_id, "failed to store learning topic");
        }
    }
}

fn clears_gates(detection: &DetectedPattern) -> bool {
    detection.confidence >= CONFIDENCE_GATE && detection.weight >= WEIGHT_GATE
}
