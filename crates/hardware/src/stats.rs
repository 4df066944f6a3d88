//! Simulation statistics collection and reporting.
//!
//! This module tracks performance metrics for a trace replay. It provides:
//! 1. **Per-level counters:** Read/write hits and misses, no-action notices, evictions
//!    and dirty write-backs, updated in line with every cache event.
//! 2. **Trace totals:** Number of reads and writes issued by the trace.
//! 3. **Reporting:** Hit rates and a sectioned text summary.

use std::time::Instant;

use crate::common::AccessType;
use crate::core::Hierarchy;
use crate::core::units::cache::CacheEvent;

/// Event counters for one cache level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelStats {
    /// Reads that found their block resident.
    pub read_hits: u64,
    /// Reads that had to pull their block from below.
    pub read_misses: u64,
    /// Writes that found their block resident.
    pub write_hits: u64,
    /// Writes forwarded below without allocation.
    pub write_misses: u64,
    /// Requests serviced by a level above without touching this one.
    pub no_actions: u64,
    /// Lines replaced by a read miss.
    pub evictions: u64,
    /// Evicted lines that were dirty and written back below.
    pub writebacks: u64,
}

impl LevelStats {
    /// Counts one event.
    pub const fn record(&mut self, event: CacheEvent) {
        match event {
            CacheEvent::ReadHit(_) => self.read_hits += 1,
            CacheEvent::ReadMiss(_) => self.read_misses += 1,
            CacheEvent::WriteHit(_) => self.write_hits += 1,
            CacheEvent::WriteMiss(_) => self.write_misses += 1,
            CacheEvent::NoAction(_) => self.no_actions += 1,
            CacheEvent::Eviction(_) => self.evictions += 1,
        }
    }

    /// Total hits.
    pub const fn hits(&self) -> u64 {
        self.read_hits + self.write_hits
    }

    /// Total misses.
    pub const fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }

    /// Hits divided by accesses, or 0 when the level was never accessed.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits() + self.misses();
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"levels"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "levels"];

/// Statistics for one trace replay.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Trace reads replayed.
    pub reads: u64,
    /// Trace writes replayed.
    pub writes: u64,
    /// Per-level counters, nearest level first, with the level label.
    pub levels: Vec<(String, LevelStats)>,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            reads: 0,
            writes: 0,
            levels: Vec::new(),
        }
    }
}

impl SimStats {
    /// Counts one trace access.
    pub const fn record_access(&mut self, op: AccessType) {
        match op {
            AccessType::Read => self.reads += 1,
            AccessType::Write => self.writes += 1,
        }
    }

    /// Total trace accesses.
    pub const fn accesses(&self) -> u64 {
        self.reads + self.writes
    }

    /// Copies the per-level counters out of `hierarchy`.
    pub fn snapshot(&mut self, hierarchy: &Hierarchy) {
        self.levels = hierarchy
            .levels()
            .iter()
            .map(|level| (level.name().to_owned(), level.stats().clone()))
            .collect();
    }

    /// Prints all statistics sections to stdout.
    pub fn print(&self) {
        self.print_sections(&[]);
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an
    /// empty slice to print all sections (same as `print()`).
    #[allow(clippy::cast_precision_loss)]
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let seconds = self.start_time.elapsed().as_secs_f64();

        if want("summary") {
            let rate = if seconds > 0.0 {
                self.accesses() as f64 / seconds / 1000.0
            } else {
                0.0
            };
            println!("\n==========================================================");
            println!("CACHE HIERARCHY SIMULATION STATISTICS");
            println!("==========================================================");
            println!("host_seconds             {seconds:.4} s");
            println!("sim_accesses             {}", self.accesses());
            println!("sim_reads                {}", self.reads);
            println!("sim_writes               {}", self.writes);
            println!("sim_rate                 {rate:.2} kacc/s");
            println!("----------------------------------------------------------");
        }
        if want("levels") {
            println!("CACHE LEVELS");
            for (name, stats) in &self.levels {
                let key = name.to_lowercase();
                println!("  {key}.read_hits         {}", stats.read_hits);
                println!("  {key}.read_misses       {}", stats.read_misses);
                println!("  {key}.write_hits        {}", stats.write_hits);
                println!("  {key}.write_misses      {}", stats.write_misses);
                println!("  {key}.evictions         {}", stats.evictions);
                println!("  {key}.writebacks        {}", stats.writebacks);
                println!("  {key}.hit_rate          {:.2}%", stats.hit_rate() * 100.0);
            }
            println!("----------------------------------------------------------");
        }
    }
}
