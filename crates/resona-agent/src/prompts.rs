// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt templates and renderers for the three model operations.
//!
//! All three prompts demand strict JSON output (or a bare sentinel for the
//! analyzer); the parsing side lives in [`crate::ops`].

use resona_core::{MessageRecord, PatternKind, Role};

/// Sentinel the analyzer emits when no pattern is visible in the window.
pub const NO_PATTERN_SENTINEL: &str = "NO_PATTERN_DETECTED";

const REFLECTION_PERSONA: &str = "\
You are Resona, a warm and attentive reflection companion. You listen closely, \
mirror back what you hear without judgment, and gently surface what might be \
underneath. You never diagnose, prescribe, or moralize. Keep your language \
plain and human.

Respond with a single JSON object, nothing else:
{
  \"reflection\": \"an empathetic reflection of what the user shared\",
  \"insight\": \"one gentle observation, or an empty string\",
  \"follow_up\": \"one open question inviting them deeper, or an empty string\"
}";

/// Render the reflection prompt: persona, recent history, current message.
pub fn render_reflection(history: &[MessageRecord], user_message: &str) -> String {
    let mut prompt = String::from(REFLECTION_PERSONA);
    if !history.is_empty() {
        prompt.push_str("\n\nRecent conversation:\n");
        prompt.push_str(&render_history(history));
    }
    prompt.push_str("\n\nThe user just said:\n");
    prompt.push_str(user_message);
    prompt
}

/// Render the pattern analysis prompt over a conversation window.
///
/// `known_patterns` are `name (status)` summaries of patterns already tracked
/// for this user; the analyzer is told to reuse the names so a recurring
/// pattern keeps one stable identity.
pub fn render_analysis(history: &[MessageRecord], known_patterns: &[String]) -> String {
    let known_section = if known_patterns.is_empty() {
        String::new()
    } else {
        format!(
            "\n\nPatterns already tracked for this user: {}.\n\
If one of these reappears, report it under the exact same name.",
            known_patterns.join(", ")
        )
    };
    format!(
        "You are an analyst reviewing a reflective conversation for recurring \
emotional, cognitive, or behavioral patterns. Only report a pattern when the \
conversation gives real evidence for it.{known_section}

Conversation:
{}

If you find patterns, respond with a JSON array, nothing else:
[
  {{
    \"name\": \"short lowercase pattern name\",
    \"kind\": \"emotional\" | \"cognitive\" | \"behavioral\",
    \"confidence\": 0.0 to 1.0,
    \"weight\": 0.0 to 1.0 for how much this shapes the user's wellbeing,
    \"reasoning\": \"one sentence of evidence\"
  }}
]

If no pattern is clearly present, respond with exactly:
{NO_PATTERN_SENTINEL}",
        render_history(history)
    )
}

/// Render the learning topic prompt for a newly surfaced pattern.
pub fn render_topic(pattern_name: &str, kind: PatternKind) -> String {
    format!(
        "A person exploring their inner life has just discovered a recurring \
{kind} pattern in themselves called \"{pattern_name}\". Write a short, \
beginner-friendly micro-lesson that helps them understand this pattern with \
curiosity instead of shame.

Respond with a single JSON object, nothing else:
{{
  \"title\": \"inviting title, under 10 words\",
  \"content\": \"2-3 short paragraphs of accessible explanation\",
  \"hint\": \"one small reflective exercise they can try today\"
}}"
    )
}

fn render_history(history: &[MessageRecord]) -> String {
    history
        .iter()
        .map(|m| {
            let speaker = match m.role {
                Role::User => "User",
                Role::Assistant => "Resona",
            };
            format!("{speaker}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
