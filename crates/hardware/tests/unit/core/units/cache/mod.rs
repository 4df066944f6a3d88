//! Cache unit tests.

/// Single-level read/write/propagation behaviour.
pub mod cache_level;
