// SPDX-FileCopyrightText: 2026 Auto-Venda Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table.

pub mod history;
pub mod onboarding;
pub mod subscriptions;
pub mod users;

use std::str::FromStr;

/// Parse a TEXT column into a strum enum, reporting a conversion failure on bad data.
pub(crate) fn parse_column<T>(value: String, idx: usize) -> Result<T, rusqlite::Error>
where
    T: FromStr<Err = strum::ParseError>,
{
    T::from_str(&value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
