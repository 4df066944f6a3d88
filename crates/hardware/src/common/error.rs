//! Simulator error definitions.
//!
//! This module defines the error type returned by fallible simulator operations. It covers:
//! 1. **Geometry Errors:** Cache shapes that cannot be decoded with bit masks.
//! 2. **Configuration Errors:** Malformed text or JSON hierarchy descriptions.
//! 3. **I/O Errors:** Failures opening or writing config, trace and output files.
//!
//! Internal consistency violations inside the engine (for example a set holding more
//! lines than it has ways) are defects, not user-facing conditions, and panic instead.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors produced while building or driving a cache hierarchy.
#[derive(Debug, Error)]
pub enum SimError {
    /// A cache was configured with zero ways per set.
    #[error("cache `{name}`: associativity must be at least 1")]
    ZeroWays {
        /// Label of the offending cache level.
        name: String,
    },

    /// Block size or derived set count is zero or not a power of two.
    #[error(
        "cache `{name}`: invalid geometry (block {block_bytes} B, {ways} ways, {size_bytes} B): {reason}"
    )]
    InvalidGeometry {
        /// Label of the offending cache level.
        name: String,
        /// Block size in bytes.
        block_bytes: u32,
        /// Ways per set.
        ways: u32,
        /// Total capacity in bytes.
        size_bytes: u32,
        /// Which constraint was violated.
        reason: &'static str,
    },

    /// A hierarchy was requested with no cache levels.
    #[error("cache hierarchy must contain at least one level")]
    EmptyHierarchy,

    /// A passthrough level was placed inside the chain; only the appended sink may be one.
    #[error("cache `{name}`: passthrough levels may only terminate the hierarchy")]
    MisplacedPassthrough {
        /// Label of the offending level.
        name: String,
    },

    /// The text configuration format could not be parsed.
    #[error("config line {line}: {reason}")]
    ConfigParse {
        /// 1-based line number of the bad record.
        line: usize,
        /// Description of the problem.
        reason: String,
    },

    /// The JSON configuration could not be deserialized.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
