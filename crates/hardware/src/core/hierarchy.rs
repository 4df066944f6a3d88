//! Cache Hierarchy Assembly.
//!
//! A [`Hierarchy`] owns every cache level in a single vector, nearest level first,
//! terminated by a passthrough `memory` sink. The "next level" of entry `i` is entry
//! `i + 1`; the chain is fixed when the hierarchy is built and cannot be re-linked,
//! since occupancy and replacement state only make sense for the chain they were
//! built up under.
//!
//! Every access returns an [`AccessReport`] with one classification per cache level.

use std::fmt;

use tracing::info;

use super::units::cache::{AccessState, CacheLevel};
use crate::common::{AccessType, Result, SimError};
use crate::config::HierarchyConfig;

/// Label given to the passthrough level terminating every hierarchy.
pub const SINK_NAME: &str = "memory";

/// Per-level classification of one access, nearest level first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessReport {
    states: Vec<AccessState>,
}

impl AccessReport {
    /// Classifications, one per cache level.
    pub fn states(&self) -> &[AccessState] {
        &self.states
    }

    /// Classification at level `index`; `NoAction` past the last level.
    pub fn level(&self, index: usize) -> AccessState {
        self.states.get(index).copied().unwrap_or_default()
    }
}

impl fmt::Display for AccessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, state) in self.states.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{state}")?;
        }
        Ok(())
    }
}

/// A linear chain of cache levels ending in a passthrough sink.
#[derive(Debug)]
pub struct Hierarchy {
    /// Cache levels followed by the sink.
    levels: Vec<CacheLevel>,
}

impl Hierarchy {
    /// Links `levels` into a chain, nearest first, and appends the sink.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::EmptyHierarchy`] if `levels` is empty and
    /// [`SimError::MisplacedPassthrough`] if any of them is a passthrough level.
    pub fn new(mut levels: Vec<CacheLevel>) -> Result<Self> {
        if levels.is_empty() {
            return Err(SimError::EmptyHierarchy);
        }
        if let Some(level) = levels.iter().find(|level| level.is_passthrough()) {
            return Err(SimError::MisplacedPassthrough {
                name: level.name().to_owned(),
            });
        }
        levels.push(CacheLevel::passthrough(SINK_NAME));
        info!(
            levels = %levels.iter().map(CacheLevel::name).collect::<Vec<_>>().join(" -> "),
            "cache hierarchy assembled"
        );
        Ok(Self { levels })
    }

    /// Builds every configured level and links them.
    ///
    /// # Errors
    ///
    /// Returns an error if any level has an invalid geometry or none are configured.
    pub fn from_config(config: &HierarchyConfig) -> Result<Self> {
        let levels = config
            .levels
            .iter()
            .map(CacheLevel::from_config)
            .collect::<Result<Vec<_>>>()?;
        Self::new(levels)
    }

    /// Number of cache levels, excluding the sink.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Cache levels, nearest first, excluding the sink.
    pub fn levels(&self) -> &[CacheLevel] {
        &self.levels[..self.depth()]
    }

    /// Cache level `index`, excluding the sink.
    pub fn level(&self, index: usize) -> Option<&CacheLevel> {
        self.levels().get(index)
    }

    /// Mutable cache level `index`, for installing observers.
    pub fn level_mut(&mut self, index: usize) -> Option<&mut CacheLevel> {
        let depth = self.depth();
        self.levels[..depth].get_mut(index)
    }

    /// The passthrough level terminating the chain.
    pub fn sink(&self) -> &CacheLevel {
        &self.levels[self.depth()]
    }

    /// Reads `addr` through the head level.
    pub fn read(&mut self, addr: u32) -> AccessReport {
        self.access(AccessType::Read, addr)
    }

    /// Writes `addr` through the head level.
    pub fn write(&mut self, addr: u32) -> AccessReport {
        self.access(AccessType::Write, addr)
    }

    /// Replays one access through the head level and reports every level's classification.
    pub fn access(&mut self, op: AccessType, addr: u32) -> AccessReport {
        for level in &mut self.levels {
            level.begin_access();
        }
        if let Some((head, lower)) = self.levels.split_first_mut() {
            match op {
                AccessType::Read => head.read(addr, lower),
                AccessType::Write => head.write(addr, lower),
            }
        }
        AccessReport {
            states: self.levels().iter().map(CacheLevel::last_state).collect(),
        }
    }
}
