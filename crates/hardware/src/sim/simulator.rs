//! Simulator: owns the cache hierarchy and the statistics of one trace replay.

use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use super::trace::{TraceEntry, TraceReader};
use crate::common::Result;
use crate::config::HierarchyConfig;
use crate::core::{AccessReport, Hierarchy};
use crate::stats::SimStats;

/// Top-level simulator: cache hierarchy + replay statistics.
#[derive(Debug)]
pub struct Simulator {
    hierarchy: Hierarchy,
    stats: SimStats,
}

impl Simulator {
    /// Creates a simulator around an assembled hierarchy.
    pub fn new(hierarchy: Hierarchy) -> Self {
        Self {
            hierarchy,
            stats: SimStats::default(),
        }
    }

    /// Builds the hierarchy described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &HierarchyConfig) -> Result<Self> {
        Ok(Self::new(Hierarchy::from_config(config)?))
    }

    /// The simulated hierarchy.
    pub const fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Mutable access to the hierarchy, for installing observers.
    pub const fn hierarchy_mut(&mut self) -> &mut Hierarchy {
        &mut self.hierarchy
    }

    /// Statistics as of the last completed [`Simulator::run`] or [`Simulator::snapshot`].
    pub const fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Refreshes the per-level counters in [`Simulator::stats`].
    pub fn snapshot(&mut self) {
        self.stats.snapshot(&self.hierarchy);
    }

    /// Replays one trace entry.
    pub fn step(&mut self, entry: TraceEntry) -> AccessReport {
        self.stats.record_access(entry.op);
        self.hierarchy.access(entry.op, entry.addr)
    }

    /// Replays a whole trace, writing one line of per-level codes per access.
    ///
    /// # Arguments
    ///
    /// * `reader` - Trace source; replay stops at the first malformed line.
    /// * `writer` - Output sink for lines such as `2 1`.
    ///
    /// # Returns
    ///
    /// The number of accesses replayed.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the trace or writing the output fails.
    pub fn run<R: BufRead, W: Write>(&mut self, reader: R, mut writer: W) -> Result<usize> {
        let mut trace = TraceReader::new(reader);
        let mut count = 0;
        for entry in trace.by_ref() {
            let report = self.step(entry?);
            writeln!(writer, "{report}")?;
            count += 1;
        }
        writer.flush()?;
        self.snapshot();
        info!(
            accesses = count,
            stopped_at = ?trace.stopped_at(),
            "trace replay finished"
        );
        Ok(count)
    }
}

/// Output path for a trace: the trace path with `.out` appended.
pub fn output_path_for(trace: &Path) -> PathBuf {
    let mut path = OsString::from(trace.as_os_str());
    path.push(".out");
    PathBuf::from(path)
}
