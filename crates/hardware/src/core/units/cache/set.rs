//! Associative Set with Round-Robin Replacement.
//!
//! A set holds up to `ways` resident block tags, each with a dirty bit. Lines fill
//! the free ways in order; once the set is full, victims are chosen by a per-set
//! cursor that cycles `0..ways` and advances only when a line is evicted. Hits and
//! fills of empty ways never move the cursor.
//!
//! # Performance
//!
//! - **Lookup:** O(ways) linear scan of the occupied ways
//! - **Replacement:** O(1)
//! - **Hardware Cost:** One `log2(ways)`-bit counter per set

use std::mem;

/// Result of a read lookup in a single set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The tag was resident.
    Hit,
    /// The tag was installed into a free way.
    MissNoEvict,
    /// The tag replaced a clean line; carries the evicted tag.
    MissEvictClean(u32),
    /// The tag replaced a modified line that must be written back; carries the evicted tag.
    MissEvictDirty(u32),
}

/// Result of a write lookup in a single set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The tag was resident and is now dirty.
    Hit,
    /// The tag was not resident; nothing was allocated.
    Miss,
}

/// One way of a set.
#[derive(Clone, Copy, Debug, Default)]
struct Way {
    tag: u32,
    dirty: bool,
}

/// One associative set: resident tags, dirty bits and the replacement cursor.
#[derive(Clone, Debug)]
pub struct CacheSet {
    /// Ways `0..occupied` hold valid lines; the rest are free.
    ways: Vec<Way>,
    occupied: usize,
    /// Next way to evict once the set is full.
    cursor: usize,
}

impl CacheSet {
    /// Creates an empty set with `ways` slots.
    ///
    /// # Panics
    ///
    /// Panics if `ways` is zero; geometry validation rejects that earlier.
    pub fn new(ways: usize) -> Self {
        assert!(ways > 0, "a cache set needs at least one way");
        Self {
            ways: vec![Way::default(); ways],
            occupied: 0,
            cursor: 0,
        }
    }

    /// Associativity of the set.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.ways.len()
    }

    /// Number of ways currently holding a valid line.
    #[inline]
    pub const fn occupied(&self) -> usize {
        self.occupied
    }

    /// Way that the next eviction will replace.
    #[inline]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns `true` if `tag` is resident.
    pub fn contains(&self, tag: u32) -> bool {
        self.find(tag).is_some()
    }

    /// Returns `true` if `tag` is resident and modified.
    pub fn is_dirty(&self, tag: u32) -> bool {
        self.find(tag).is_some_and(|way| self.ways[way].dirty)
    }

    /// Resident tags in way order.
    pub fn tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.ways[..self.occupied].iter().map(|way| way.tag)
    }

    fn find(&self, tag: u32) -> Option<usize> {
        self.ways[..self.occupied]
            .iter()
            .position(|way| way.tag == tag)
    }

    fn check_occupancy(&self) {
        assert!(
            self.occupied <= self.ways.len(),
            "set occupancy {} exceeds associativity {}",
            self.occupied,
            self.ways.len()
        );
    }

    /// Looks up `tag` for a read, allocating it on a miss.
    ///
    /// A miss fills the next free way if there is one. Otherwise the way under the
    /// cursor is replaced, the cursor advances, and the outcome reports the evicted
    /// tag along with whether it was dirty. The new line is always clean.
    pub fn read(&mut self, tag: u32) -> ReadOutcome {
        self.check_occupancy();

        if self.find(tag).is_some() {
            return ReadOutcome::Hit;
        }

        let line = Way { tag, dirty: false };
        if self.occupied < self.ways.len() {
            self.ways[self.occupied] = line;
            self.occupied += 1;
            return ReadOutcome::MissNoEvict;
        }

        let victim = self.cursor;
        self.cursor = (self.cursor + 1) % self.ways.len();
        let evicted = mem::replace(&mut self.ways[victim], line);
        if evicted.dirty {
            ReadOutcome::MissEvictDirty(evicted.tag)
        } else {
            ReadOutcome::MissEvictClean(evicted.tag)
        }
    }

    /// Looks up `tag` for a write.
    ///
    /// A hit marks the line dirty. A miss leaves the set untouched (no-write-allocate).
    pub fn write(&mut self, tag: u32) -> WriteOutcome {
        self.check_occupancy();

        match self.find(tag) {
            Some(way) => {
                self.ways[way].dirty = true;
                WriteOutcome::Hit
            }
            None => WriteOutcome::Miss,
        }
    }
}
