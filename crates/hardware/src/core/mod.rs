//! Cache hierarchy engine.
//!
//! This module contains the cache level implementation (sets, replacement,
//! write-back and event notification) and the hierarchy that chains levels
//! together and replays accesses through them.

/// Linear chain of cache levels and per-access reports.
pub mod hierarchy;

/// Functional units (set-associative cache levels).
pub mod units;

pub use self::hierarchy::{AccessReport, Hierarchy};
