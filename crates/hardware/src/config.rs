//! Configuration system for the cache simulator.
//!
//! This module defines the structures used to describe a cache hierarchy. It provides:
//! 1. **Defaults:** Baseline L1/L2 shapes used when nothing is supplied.
//! 2. **Structures:** Per-level cache config and the ordered hierarchy config.
//! 3. **Parsing:** The whitespace text format (`<label> <blockSize> <waysPerSet> <sizeInKiB>`,
//!    one level per line, nearest level first) and an equivalent JSON form.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::common::{Geometry, Result, SimError};

/// Default configuration constants for the simulator.
mod defaults {
    /// Default L1 block size in bytes.
    pub const L1_BLOCK: u32 = 32;

    /// Default L1 associativity.
    pub const L1_WAYS: u32 = 4;

    /// Default L1 capacity (32 KiB).
    pub const L1_SIZE_KIB: u32 = 32;

    /// Default L2 block size in bytes.
    pub const L2_BLOCK: u32 = 64;

    /// Default L2 associativity.
    pub const L2_WAYS: u32 = 8;

    /// Default L2 capacity (256 KiB).
    pub const L2_SIZE_KIB: u32 = 256;
}

/// Bytes per KiB, the unit of the size field.
const KIB: u32 = 1024;

/// Individual cache level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Label of the level (e.g. `"L1"`); filled in from the position when omitted.
    #[serde(default)]
    pub name: String,

    /// Block (line) size in bytes
    #[serde(default = "CacheConfig::default_block")]
    pub block_bytes: u32,

    /// Associativity (ways per set)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: u32,

    /// Total capacity in KiB
    #[serde(default = "CacheConfig::default_size_kib")]
    pub size_kib: u32,
}

impl CacheConfig {
    /// Returns the default block size in bytes.
    const fn default_block() -> u32 {
        defaults::L1_BLOCK
    }

    /// Returns the default associativity.
    const fn default_ways() -> u32 {
        defaults::L1_WAYS
    }

    /// Returns the default capacity in KiB.
    const fn default_size_kib() -> u32 {
        defaults::L1_SIZE_KIB
    }

    /// Capacity in bytes, or `None` if it does not fit in 32 bits.
    pub const fn size_bytes(&self) -> Option<u32> {
        self.size_kib.checked_mul(KIB)
    }

    /// Validated geometry for this level.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity overflows or the shape is invalid.
    pub fn geometry(&self) -> Result<Geometry> {
        let size_bytes = self.size_bytes().ok_or_else(|| SimError::InvalidGeometry {
            name: self.name.clone(),
            block_bytes: self.block_bytes,
            ways: self.ways,
            size_bytes: u32::MAX,
            reason: "capacity does not fit in the 32-bit address space",
        })?;
        Geometry::new(&self.name, self.block_bytes, self.ways, size_bytes)
    }
}

impl Default for CacheConfig {
    /// Creates the default L1 configuration.
    fn default() -> Self {
        Self {
            name: "L1".to_owned(),
            block_bytes: defaults::L1_BLOCK,
            ways: defaults::L1_WAYS,
            size_kib: defaults::L1_SIZE_KIB,
        }
    }
}

/// Cache hierarchy configuration, nearest level first.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::HierarchyConfig;
///
/// let config = HierarchyConfig::parse_text("L1 8 2 1\nL2 16 4 4\n").unwrap();
/// assert_eq!(config.levels.len(), 2);
/// assert_eq!(config.levels[1].name, "L2");
/// assert_eq!(config.levels[1].size_bytes(), Some(4096));
/// ```
///
/// The JSON form carries the same fields:
///
/// ```
/// use cachesim_core::config::HierarchyConfig;
///
/// let json = r#"{
///     "levels": [
///         { "name": "L1", "block_bytes": 8, "ways": 2, "size_kib": 1 },
///         { "block_bytes": 16, "ways": 4, "size_kib": 4 }
///     ]
/// }"#;
///
/// let config = HierarchyConfig::parse_json(json).unwrap();
/// assert_eq!(config.levels[1].name, "L2");
/// assert_eq!(config.levels[1].ways, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HierarchyConfig {
    /// Cache levels, nearest to the trace first
    pub levels: Vec<CacheConfig>,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            levels: vec![
                CacheConfig::default(),
                CacheConfig {
                    name: "L2".to_owned(),
                    block_bytes: defaults::L2_BLOCK,
                    ways: defaults::L2_WAYS,
                    size_kib: defaults::L2_SIZE_KIB,
                },
            ],
        }
    }
}

impl HierarchyConfig {
    /// Parses the text format: one `<label> <blockSize> <waysPerSet> <sizeInKiB>`
    /// record per line. Blank lines and `#` comments are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ConfigParse`] for records with missing, extra or
    /// non-numeric fields, and [`SimError::EmptyHierarchy`] if there are none.
    pub fn parse_text(text: &str) -> Result<Self> {
        let mut levels = Vec::new();

        for (i, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let parse_err = |reason: String| SimError::ConfigParse { line: i + 1, reason };

            let fields: Vec<&str> = line.split_whitespace().collect();
            let [name, block, ways, size] = fields[..] else {
                return Err(parse_err(format!(
                    "expected `<label> <blockSize> <waysPerSet> <sizeInKiB>`, found {} field(s)",
                    fields.len()
                )));
            };
            let number = |field: &str, what: &str| {
                field
                    .parse::<u32>()
                    .map_err(|e| parse_err(format!("invalid {what} `{field}`: {e}")))
            };

            levels.push(CacheConfig {
                name: name.to_owned(),
                block_bytes: number(block, "block size")?,
                ways: number(ways, "ways per set")?,
                size_kib: number(size, "size in KiB")?,
            });
        }

        let config = Self { levels };
        config.validate()?;
        Ok(config)
    }

    /// Parses the JSON form.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Json`] for malformed JSON and a geometry error for invalid levels.
    pub fn parse_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        for (i, level) in config.levels.iter_mut().enumerate() {
            if level.name.is_empty() {
                level.name = format!("L{}", i + 1);
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file, choosing JSON for a `.json` extension and text otherwise.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a parse error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        debug!(path = %path.display(), json = is_json, "loading cache config");
        if is_json {
            Self::parse_json(&contents)
        } else {
            Self::parse_text(&contents)
        }
    }

    /// Checks that there is at least one level and every geometry is valid.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.levels.is_empty() {
            return Err(SimError::EmptyHierarchy);
        }
        for level in &self.levels {
            let _ = level.geometry()?;
        }
        Ok(())
    }
}
