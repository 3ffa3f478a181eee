// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Resona reflection agent.
//!
//! A single tokio-rusqlite connection serializes all access through one
//! background thread; schema changes ship as embedded refinery migrations.

pub mod database;
pub mod migrations;
pub mod queries;
pub mod store;

pub use database::Database;
pub use store::SqliteStore;
