//! Common utilities and types used throughout the cache simulator.
//!
//! This module provides fundamental building blocks that are shared across all components
//! of the simulator. It includes:
//! 1. **Address Codec:** Cache geometry and `(tag, index, offset)` decomposition.
//! 2. **Memory Access:** Definitions for categorizing trace operations (Read/Write).
//! 3. **Error Handling:** The crate-wide error type and result alias.

/// Cache geometry and address decomposition.
pub mod addr;

/// Memory access type definitions.
pub mod data;

/// Error types.
pub mod error;

pub use addr::{DecodedAddr, Geometry};
pub use data::AccessType;
pub use error::{Result, SimError};
