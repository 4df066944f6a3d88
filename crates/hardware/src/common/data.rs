//! Memory Access Types.
//!
//! This module defines the classification of memory accesses replayed through the hierarchy.
//! These types are used for the following:
//! 1. **Trace Parsing:** Mapping the `R`/`W` mnemonic of each trace line to an operation.
//! 2. **Dispatch:** Selecting the read or write path of the head cache level.
//! 3. **Statistics Tracking:** Counting reads and writes issued by the trace.

use std::fmt;
use std::str::FromStr;

/// Type of memory access operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessType {
    /// Data read access (`R` in a trace).
    ///
    /// Misses allocate a line in the level that missed.
    Read,

    /// Data write access (`W` in a trace).
    ///
    /// Misses are forwarded downward without allocating (no-write-allocate).
    Write,
}

impl AccessType {
    /// Returns the single-letter trace mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Read => "R",
            Self::Write => "W",
        }
    }
}

impl FromStr for AccessType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "R" | "r" => Ok(Self::Read),
            "W" | "w" => Ok(Self::Write),
            _ => Err(()),
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
