//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete.

/// Autocomplete handlers for part names, services, mechanics, statuses and periods
pub mod autocomplete;
