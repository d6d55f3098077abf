//! Core business logic - framework-agnostic operations over the record store.
//!
//! Every function takes a SeaORM connection and returns [`crate::errors::Result`].
//! Validation happens before the first store call so rejected input never writes.

/// Customer records
pub mod customer;
/// Home-screen counters
pub mod dashboard;
/// Order finalization: total, part usage, stock decrement
pub mod finalize;
/// Amount parsing and currency formatting
pub mod money;
/// Service order creation, editing, status and lookup
pub mod order;
/// Parts inventory
pub mod part;
/// Revenue aggregation over finalized orders
pub mod revenue;
/// Vehicle records
pub mod vehicle;

use crate::errors::{Error, Result};

/// Minimum number of characters before a customer lookup hits the store.
pub const MIN_SEARCH_LEN: usize = 2;

/// Trims a required text field, rejecting it when empty.
pub(crate) fn required(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field; blank input becomes `None`.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lower-cased search term. Folding happens in Rust because SQLite `LIKE` only folds
/// ASCII, which misses accented names.
pub(crate) fn search_key(term: &str) -> String {
    term.trim().to_lowercase()
}

/// True when any of `fields` contains `key` (already passed through [`search_key`]).
pub(crate) fn matches_any<'a>(
    key: &str,
    fields: impl IntoIterator<Item = Option<&'a str>>,
) -> bool {
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(key))
}
