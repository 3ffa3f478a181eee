// SPDX-FileCopyrightText: 2026 Resona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table family.

pub mod messages;
pub mod patterns;
pub mod topics;

/// Parse a wire string from column `idx` into its domain enum.
///
/// A failure here means the database holds a value outside the schema's
/// CHECK constraints, so it surfaces as a conversion error, not a panic.
pub(crate) fn parse_wire<T>(idx: usize, value: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
