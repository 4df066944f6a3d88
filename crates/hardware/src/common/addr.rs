//! Address decomposition for set-associative caches.
//!
//! This module maps 32-bit byte addresses onto cache coordinates and back. It provides:
//! 1. **Geometry:** A validated cache shape (block size, ways, capacity, derived set count).
//! 2. **Decoding:** Splitting an address into `(tag, index, offset)` with shifts and masks.
//! 3. **Encoding:** Rebuilding an address from its coordinates, used to recover the base
//!    address of an evicted block (callers pass `offset = 0`).
//!
//! For an address `A`, block size `B` and set count `S`:
//!
//! ```text
//! offset = A mod B
//! index  = (A / B) mod S
//! tag    = A / B / S
//! tag * B * S + index * B + offset == A
//! ```

use std::ops::Range;

use super::error::{Result, SimError};

/// An address split into its cache coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct DecodedAddr {
    /// Bits above index and offset; identifies the block within its set.
    pub tag: u32,
    /// Set selector.
    pub index: u32,
    /// Byte within the block.
    pub offset: u32,
}

/// Validated shape of one cache level.
///
/// Block size and set count are both powers of two, so decoding is exact bit
/// slicing. Construct with [`Geometry::new`]; the fields are immutable afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    block_bytes: u32,
    ways: u32,
    size_bytes: u32,
    num_sets: u32,
    offset_bits: u32,
    index_bits: u32,
}

impl Geometry {
    /// Validates a cache shape.
    ///
    /// # Arguments
    ///
    /// * `name` - Label of the cache level, used in error messages.
    /// * `block_bytes` - Block (line) size in bytes; must be a power of two.
    /// * `ways` - Associativity; must be at least 1.
    /// * `size_bytes` - Total capacity; must be `ways * block_bytes * 2^k`.
    ///
    /// # Errors
    ///
    /// [`SimError::ZeroWays`] for zero associativity and
    /// [`SimError::InvalidGeometry`] when the block size or derived set count
    /// is not a non-zero power of two.
    pub fn new(name: &str, block_bytes: u32, ways: u32, size_bytes: u32) -> Result<Self> {
        let invalid = |reason: &'static str| SimError::InvalidGeometry {
            name: name.to_owned(),
            block_bytes,
            ways,
            size_bytes,
            reason,
        };

        if ways == 0 {
            return Err(SimError::ZeroWays {
                name: name.to_owned(),
            });
        }
        if !block_bytes.is_power_of_two() {
            return Err(invalid("block size must be a power of two"));
        }
        let way_bytes = u64::from(ways) * u64::from(block_bytes);
        if u64::from(size_bytes) % way_bytes != 0 {
            return Err(invalid("capacity must be a multiple of ways x block size"));
        }
        let num_sets = size_bytes / ways / block_bytes;
        if !num_sets.is_power_of_two() {
            return Err(invalid("set count must be a non-zero power of two"));
        }

        Ok(Self {
            block_bytes,
            ways,
            size_bytes,
            num_sets,
            offset_bits: block_bytes.trailing_zeros(),
            index_bits: num_sets.trailing_zeros(),
        })
    }

    /// Block size in bytes.
    #[inline]
    pub const fn block_bytes(&self) -> u32 {
        self.block_bytes
    }

    /// Ways per set.
    #[inline]
    pub const fn ways(&self) -> u32 {
        self.ways
    }

    /// Total capacity in bytes.
    #[inline]
    pub const fn size_bytes(&self) -> u32 {
        self.size_bytes
    }

    /// Number of sets (`size / ways / block`).
    #[inline]
    pub const fn num_sets(&self) -> u32 {
        self.num_sets
    }

    /// Splits `addr` into `(tag, index, offset)`.
    #[inline]
    pub const fn decode(&self, addr: u32) -> DecodedAddr {
        let tag_shift = self.offset_bits + self.index_bits;
        DecodedAddr {
            tag: match addr.checked_shr(tag_shift) {
                Some(tag) => tag,
                None => 0,
            },
            index: (addr >> self.offset_bits) & (self.num_sets - 1),
            offset: addr & (self.block_bytes - 1),
        }
    }

    /// Rebuilds the address with the given coordinates.
    ///
    /// Exact inverse of [`Geometry::decode`] for coordinates within bounds.
    #[inline]
    pub const fn encode(&self, tag: u32, index: u32, offset: u32) -> u32 {
        let tag_shift = self.offset_bits + self.index_bits;
        let high = match tag.checked_shl(tag_shift) {
            Some(high) => high,
            None => 0,
        };
        high | (index << self.offset_bits) | offset
    }

    /// Base address of the block containing `addr`.
    #[inline]
    pub const fn block_base(&self, addr: u32) -> u32 {
        addr & !(self.block_bytes - 1)
    }

    /// Byte range `[base, base + block)` of the block containing `addr`.
    ///
    /// Widened to `u64` so the last block of the address space does not overflow.
    #[inline]
    pub fn block_range(&self, addr: u32) -> Range<u64> {
        let base = u64::from(self.block_base(addr));
        base..base + u64::from(self.block_bytes)
    }
}

/// Decodes `addr` for an unvalidated cache shape.
///
/// Uses plain division, so it is correct for any non-zero shape; callers holding a
/// [`Geometry`] should prefer [`Geometry::decode`].
///
/// # Panics
///
/// Panics if `block_bytes`, `ways` or the derived set count is zero.
pub const fn decode(addr: u32, block_bytes: u32, ways: u32, size_bytes: u32) -> DecodedAddr {
    let num_sets = size_bytes / ways / block_bytes;
    DecodedAddr {
        tag: addr / block_bytes / num_sets,
        index: (addr / block_bytes) % num_sets,
        offset: addr % block_bytes,
    }
}

/// Inverse of [`decode`] for an unvalidated cache shape.
///
/// # Panics
///
/// Panics if `block_bytes` or `ways` is zero.
pub const fn encode(
    tag: u32,
    index: u32,
    offset: u32,
    block_bytes: u32,
    ways: u32,
    size_bytes: u32,
) -> u32 {
    let num_sets = size_bytes / ways / block_bytes;
    tag.wrapping_mul(block_bytes)
        .wrapping_mul(num_sets)
        .wrapping_add(index.wrapping_mul(block_bytes))
        .wrapping_add(offset)
}
