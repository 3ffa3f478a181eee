// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn pipeline, pattern discovery, and prompt orchestration for Resona.
//!
//! The [`pipeline::TurnPipeline`] runs one conversational turn end to end;
//! [`discovery::DiscoveryService`] serves the user-driven read/update
//! surface over what previous turns recorded.

pub mod discovery;
pub mod ops;
pub mod pipeline;
pub mod prompts;

pub use discovery::{Discovery, DiscoveryService};
pub use ops::{DetectedPattern, ModelGateway, ReflectionReply, TopicDraft};
pub use pipeline::{PatternHandle, TurnOutcome, TurnPipeline, TurnReply};
