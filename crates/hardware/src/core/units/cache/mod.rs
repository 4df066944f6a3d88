//! Set-Associative Cache Level.
//!
//! This module implements one level of a write-back, no-write-allocate cache
//! hierarchy with round-robin replacement. A level services byte-address reads and
//! writes, reports each outcome to its observer, and propagates traffic to the
//! levels below it:
//!
//! - **Read hit:** `ReadHit`; the levels below see `NoAction`.
//! - **Read miss:** `ReadMiss` (plus `Eviction` when a line is replaced). A dirty
//!   victim is written back below *before* the missing block is pulled, since both
//!   may land in the same set of the next level.
//! - **Write hit:** `WriteHit`; the line becomes dirty and the levels below see `NoAction`.
//! - **Write miss:** `WriteMiss`; the block is written through to the next level
//!   without being allocated here.
//!
//! Block-sized requests from the level above arrive as byte ranges and are split
//! into accesses at this level's own block stride. Adjacent levels are expected to
//! have block sizes that are powers of two, so one always divides the other.
//!
//! The levels below are passed explicitly as a slice whose first element is the
//! next level; a passthrough level (or an empty slice) terminates the chain.

/// Per-level event notification and access classification.
pub mod events;

/// One associative set with round-robin replacement.
pub mod set;

use std::fmt;
use std::ops::Range;

use tracing::{debug, trace};

pub use self::events::{AccessState, CacheEvent, CacheObserver, EventHooks};
pub use self::set::{CacheSet, ReadOutcome, WriteOutcome};
use crate::common::{DecodedAddr, Geometry, Result};
use crate::config::CacheConfig;
use crate::stats::LevelStats;

/// One level of the cache hierarchy, or the passthrough sink that terminates it.
pub struct CacheLevel {
    name: String,
    /// `None` for the passthrough sink.
    geometry: Option<Geometry>,
    sets: Vec<CacheSet>,
    observer: Option<Box<dyn CacheObserver>>,
    stats: LevelStats,
    /// Last classification produced since `begin_access`.
    last_state: Option<AccessState>,
}

impl CacheLevel {
    /// Creates a cache level.
    ///
    /// # Arguments
    ///
    /// * `name` - Label used in logs, errors and reports (e.g. `"L1"`).
    /// * `block_bytes` - Block size in bytes (power of two).
    /// * `ways` - Ways per set (at least 1).
    /// * `size_bytes` - Total capacity in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the geometry is invalid; see [`Geometry::new`].
    pub fn new(name: impl Into<String>, block_bytes: u32, ways: u32, size_bytes: u32) -> Result<Self> {
        let name = name.into();
        let geometry = Geometry::new(&name, block_bytes, ways, size_bytes)?;
        Ok(Self::with_geometry(name, geometry))
    }

    /// Creates a cache level from a validated geometry.
    pub fn with_geometry(name: impl Into<String>, geometry: Geometry) -> Self {
        let name = name.into();
        debug!(
            level = %name,
            block_bytes = geometry.block_bytes(),
            ways = geometry.ways(),
            sets = geometry.num_sets(),
            "cache level created"
        );
        Self {
            sets: vec![CacheSet::new(geometry.ways() as usize); geometry.num_sets() as usize],
            geometry: Some(geometry),
            name,
            observer: None,
            stats: LevelStats::default(),
            last_state: None,
        }
    }

    /// Creates a cache level from its configuration entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured geometry is invalid.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Ok(Self::with_geometry(config.name.clone(), config.geometry()?))
    }

    /// Creates a passthrough level that absorbs every request without modelling storage.
    pub fn passthrough(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geometry: None,
            sets: Vec::new(),
            observer: None,
            stats: LevelStats::default(),
            last_state: None,
        }
    }

    /// Label of this level.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Geometry, or `None` for a passthrough level.
    pub const fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Returns `true` for the passthrough sink.
    pub const fn is_passthrough(&self) -> bool {
        self.geometry.is_none()
    }

    /// Sets of this level, indexed by set index.
    pub fn sets(&self) -> &[CacheSet] {
        &self.sets
    }

    /// Event counters accumulated since construction.
    pub const fn stats(&self) -> &LevelStats {
        &self.stats
    }

    /// Returns `true` if the block containing `addr` is resident. Does not fire events.
    pub fn contains(&self, addr: u32) -> bool {
        self.geometry.is_some_and(|geometry| {
            let DecodedAddr { tag, index, .. } = geometry.decode(addr);
            self.sets[index as usize].contains(tag)
        })
    }

    /// Returns `true` if the block containing `addr` is resident and dirty.
    pub fn is_dirty(&self, addr: u32) -> bool {
        self.geometry.is_some_and(|geometry| {
            let DecodedAddr { tag, index, .. } = geometry.decode(addr);
            self.sets[index as usize].is_dirty(tag)
        })
    }

    /// Installs the observer that receives this level's events, replacing any previous one.
    pub fn set_observer(&mut self, observer: impl CacheObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Installs a bundle of per-kind callbacks as this level's observer.
    pub fn set_hooks(&mut self, hooks: EventHooks) {
        self.set_observer(hooks);
    }

    /// Forgets the classification recorded for the previous access.
    pub(crate) fn begin_access(&mut self) {
        self.last_state = None;
    }

    /// Classification of the current access at this level.
    ///
    /// When a level is touched more than once during one access (a write-back
    /// followed by a pull, or a range spanning several blocks), the last
    /// classification wins. Untouched levels report `NoAction`.
    pub fn last_state(&self) -> AccessState {
        self.last_state.unwrap_or_default()
    }

    fn emit(&mut self, event: CacheEvent) {
        trace!(level = %self.name, ?event, "cache event");
        self.stats.record(event);
        if let Some(state) = event.state() {
            self.last_state = Some(state);
        }
        if let Some(observer) = self.observer.as_mut() {
            observer.on_event(event);
        }
    }

    /// Reads the byte at `addr`.
    ///
    /// # Arguments
    ///
    /// * `addr` - Byte address.
    /// * `lower` - Levels below this one, nearest first.
    pub fn read(&mut self, addr: u32, lower: &mut [Self]) {
        let Some(geometry) = self.geometry else {
            return;
        };
        let DecodedAddr { tag, index, .. } = geometry.decode(addr);
        let pull = geometry.block_range(addr);

        match self.sets[index as usize].read(tag) {
            ReadOutcome::Hit => {
                self.emit(CacheEvent::ReadHit(addr));
                forward(lower, |next, rest| next.no_action(addr, rest));
            }
            ReadOutcome::MissNoEvict => {
                self.emit(CacheEvent::ReadMiss(addr));
                forward(lower, |next, rest| next.read_range(pull, rest));
            }
            ReadOutcome::MissEvictClean(victim) => {
                let victim_base = geometry.encode(victim, index, 0);
                self.emit(CacheEvent::ReadMiss(addr));
                self.emit(CacheEvent::Eviction(victim_base));
                debug!(level = %self.name, victim = victim_base, "evicted clean line");
                forward(lower, |next, rest| next.read_range(pull, rest));
            }
            ReadOutcome::MissEvictDirty(victim) => {
                let victim_base = geometry.encode(victim, index, 0);
                self.emit(CacheEvent::ReadMiss(addr));
                self.emit(CacheEvent::Eviction(victim_base));
                self.stats.writebacks += 1;
                debug!(level = %self.name, victim = victim_base, "writing back dirty line");
                forward(lower, |next, rest| {
                    next.write_range(geometry.block_range(victim_base), rest);
                    next.read_range(pull, rest);
                });
            }
        }
    }

    /// Writes the byte at `addr`.
    ///
    /// # Arguments
    ///
    /// * `addr` - Byte address.
    /// * `lower` - Levels below this one, nearest first.
    pub fn write(&mut self, addr: u32, lower: &mut [Self]) {
        let Some(geometry) = self.geometry else {
            return;
        };
        let DecodedAddr { tag, index, .. } = geometry.decode(addr);

        match self.sets[index as usize].write(tag) {
            WriteOutcome::Hit => {
                self.emit(CacheEvent::WriteHit(addr));
                forward(lower, |next, rest| next.no_action(addr, rest));
            }
            WriteOutcome::Miss => {
                self.emit(CacheEvent::WriteMiss(addr));
                let block = geometry.block_range(addr);
                forward(lower, |next, rest| next.write_range(block, rest));
            }
        }
    }

    /// Reads every block of this level overlapping `range`, stepping by this level's block size.
    pub fn read_range(&mut self, range: Range<u64>, lower: &mut [Self]) {
        for addr in self.strides(range) {
            self.read(addr, lower);
        }
    }

    /// Writes every block of this level overlapping `range`, stepping by this level's block size.
    pub fn write_range(&mut self, range: Range<u64>, lower: &mut [Self]) {
        for addr in self.strides(range) {
            self.write(addr, lower);
        }
    }

    /// Records that the level above serviced a request without accessing this one,
    /// and passes the notice further down.
    pub fn no_action(&mut self, addr: u32, lower: &mut [Self]) {
        if self.is_passthrough() {
            return;
        }
        self.emit(CacheEvent::NoAction(addr));
        forward(lower, |next, rest| next.no_action(addr, rest));
    }

    /// Stride-aligned addresses of `range`; empty for the passthrough sink.
    fn strides(&self, range: Range<u64>) -> impl Iterator<Item = u32> + use<> {
        let step = self.geometry.map_or(0, |geometry| geometry.block_bytes() as usize);
        let range = if step == 0 { 0..0 } else { range };
        range
            .step_by(step.max(1))
            .map_while(|addr| u32::try_from(addr).ok())
    }
}

/// Hands a request to the next level, if there is one.
fn forward(lower: &mut [CacheLevel], op: impl FnOnce(&mut CacheLevel, &mut [CacheLevel])) {
    if let Some((next, rest)) = lower.split_first_mut() {
        op(next, rest);
    }
}

impl fmt::Debug for CacheLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheLevel")
            .field("name", &self.name)
            .field("geometry", &self.geometry)
            .field("observer", &self.observer.is_some())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
