//! Multi-level cache hierarchy simulator library.
//!
//! This crate replays memory-access traces through a chain of set-associative caches:
//! 1. **Codec:** Splitting 32-bit addresses into tag, set index and block offset.
//! 2. **Cache levels:** Round-robin replacement, write-back with dirty bits, no-write-allocate.
//! 3. **Hierarchy:** Levels chained nearest-first and terminated by a passthrough sink, with
//!    block-sized traffic propagated between levels of differing block size.
//! 4. **Simulation:** Configuration, trace parsing, replay and statistics.

/// Common types (address codec, access types, errors).
pub mod common;
/// Simulator configuration (defaults, per-level and hierarchy config, text/JSON parsing).
pub mod config;
/// Cache engine (sets, cache levels, events, hierarchy).
pub mod core;
/// Trace parsing and replay.
pub mod sim;
/// Replay statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `HierarchyConfig::default()` or load from a file.
pub use crate::config::HierarchyConfig;
/// Cache hierarchy; construct with `Hierarchy::new` or `Hierarchy::from_config`.
pub use crate::core::Hierarchy;
/// Trace replay driver.
pub use crate::sim::Simulator;
