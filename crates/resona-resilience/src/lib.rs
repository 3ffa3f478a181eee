// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilience primitives for the Resona reflection agent.
//!
//! Provides the rotating API [`KeyPool`] with per-key health tracking and the
//! [`ResilientExecutor`] that retries one logical model call across keys.

pub mod executor;
pub mod keypool;

pub use executor::{ExecuteError, ResilientExecutor};
pub use keypool::{CallOutcome, KeyHealth, KeyPool, KeyStatus, mask_secret};
