//! Odds and ends shared across the crate.

/// Log targets, one per part of the search.
pub mod log;
