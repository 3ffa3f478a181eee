// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway exposing the Resona reflection API.
//!
//! Routes:
//! - `POST /api/reflect` -- run one conversational turn
//! - `GET /api/history` -- recent conversation
//! - `GET /api/discoveries` -- surfaced patterns
//! - `PATCH /api/patterns/{id}/status` -- pattern lifecycle transitions
//! - `GET /api/learning-topics` -- generated topics with their patterns
//! - `PATCH /api/learning-topics/{id}/progress` -- topic completion updates
//! - `GET /health` -- storage-backed liveness probe

pub mod handlers;
pub mod server;

pub use server::{GatewayState, ServerConfig, build_router, start_server};
