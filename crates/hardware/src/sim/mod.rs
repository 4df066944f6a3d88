//! Trace replay.
//!
//! Provides the trace file parser and the simulator that replays a trace through a
//! cache hierarchy and writes per-level hit/miss codes.

/// Top-level simulator and output file naming.
pub mod simulator;

/// Trace line parsing and iteration.
pub mod trace;

pub use simulator::{Simulator, output_path_for};
pub use trace::{TraceEntry, TraceReader};
