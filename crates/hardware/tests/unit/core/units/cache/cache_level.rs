//! Cache Level Unit Tests.
//!
//! Exercises a single `CacheLevel` and its propagation into the level below:
//! hit/miss classification, no-write-allocate, dirty write-back ordering,
//! block-size mismatches and the passthrough sink.

use cachesim_core::core::units::cache::{CacheEvent, CacheLevel};
use cachesim_core::stats::LevelStats;
use mockall::Sequence;
use mockall::predicate::eq;
use proptest::prelude::*;

use crate::common::harness::{EventLog, level};
use crate::common::mocks::MockObserver;

/// Builds `upper -> lower -> memory` and returns the pieces for direct calls.
fn pair(upper: CacheLevel, lower: CacheLevel) -> (CacheLevel, Vec<CacheLevel>) {
    (upper, vec![lower, CacheLevel::passthrough("memory")])
}

// ══════════════════════════════════════════════════════════
// 1. Reads
// ══════════════════════════════════════════════════════════

#[test]
fn read_miss_pulls_block_from_next_level() {
    let (mut l1, mut below) = pair(level("L1", 8, 2, 32), level("L2", 16, 4, 128));
    let l1_log = EventLog::new();
    let l2_log = EventLog::new();
    l1.set_observer(l1_log.observer());
    below[0].set_observer(l2_log.observer());

    l1.read(0x13, &mut below);

    assert_eq!(l1_log.take(), vec![CacheEvent::ReadMiss(0x13)]);
    assert_eq!(l2_log.take(), vec![CacheEvent::ReadMiss(0x10)]);
    assert!(l1.contains(0x10));
    assert!(below[0].contains(0x10));
}

#[test]
fn read_hit_sends_no_action_down() {
    let (mut l1, mut below) = pair(level("L1", 8, 2, 32), level("L2", 16, 4, 128));
    l1.read(0x20, &mut below);

    let l2_log = EventLog::new();
    below[0].set_observer(l2_log.observer());
    l1.read(0x27, &mut below);

    assert_eq!(l2_log.take(), vec![CacheEvent::NoAction(0x27)]);
    assert_eq!(l1.stats().read_hits, 1);
}

/// 1-way, 1-set L1: the second distinct block evicts the first.
#[test]
fn eviction_reports_victim_base_address() {
    let (mut l1, mut below) = pair(level("L1", 8, 1, 8), level("L2", 8, 2, 16));
    let log = EventLog::new();
    l1.set_observer(log.observer());

    l1.read(0x05, &mut below);
    l1.read(0x1C, &mut below);

    assert_eq!(
        log.take(),
        vec![
            CacheEvent::ReadMiss(0x05),
            CacheEvent::ReadMiss(0x1C),
            CacheEvent::Eviction(0x00),
        ]
    );
    assert_eq!(l1.stats().evictions, 1);
    assert_eq!(l1.stats().writebacks, 0);
}

#[test]
fn clean_eviction_does_not_write_back() {
    let (mut l1, mut below) = pair(level("L1", 8, 1, 8), level("L2", 8, 2, 16));
    let l2_log = EventLog::new();
    below[0].set_observer(l2_log.observer());

    l1.read(0, &mut below);
    l1.read(8, &mut below);

    assert_eq!(
        l2_log.take(),
        vec![CacheEvent::ReadMiss(0), CacheEvent::ReadMiss(8)]
    );
}

// ══════════════════════════════════════════════════════════
// 2. Writes
// ══════════════════════════════════════════════════════════

#[test]
fn write_miss_does_not_allocate() {
    let (mut l1, mut below) = pair(level("L1", 8, 2, 32), level("L2", 16, 4, 128));
    let l2_log = EventLog::new();
    below[0].set_observer(l2_log.observer());

    l1.write(0x40, &mut below);

    assert!(!l1.contains(0x40));
    assert!(!below[0].contains(0x40));
    assert_eq!(l2_log.take(), vec![CacheEvent::WriteMiss(0x40)]);

    let l1_log = EventLog::new();
    l1.set_observer(l1_log.observer());
    l1.read(0x40, &mut below);
    assert_eq!(l1_log.take(), vec![CacheEvent::ReadMiss(0x40)]);
}

#[test]
fn write_hit_marks_dirty_and_sends_no_action_down() {
    let (mut l1, mut below) = pair(level("L1", 8, 2, 32), level("L2", 16, 4, 128));
    l1.read(0x08, &mut below);
    assert!(!l1.is_dirty(0x08));

    let l2_log = EventLog::new();
    below[0].set_observer(l2_log.observer());
    l1.write(0x0A, &mut below);

    assert!(l1.is_dirty(0x08));
    assert_eq!(l2_log.take(), vec![CacheEvent::NoAction(0x0A)]);
}

// ══════════════════════════════════════════════════════════
// 3. Write-back ordering
// ══════════════════════════════════════════════════════════

/// A dirty victim is written back to L2 strictly before the missing block is pulled.
///
/// L1: 8-byte blocks, 1 way, 1 set. L2: 8-byte blocks, 2 ways, 1 set.
#[test]
fn dirty_writeback_precedes_pull() {
    let mut seq = Sequence::new();
    let mut observer = MockObserver::new();
    for event in [
        CacheEvent::ReadMiss(0),
        CacheEvent::NoAction(0),
        CacheEvent::WriteHit(0),
        CacheEvent::ReadMiss(8),
    ] {
        let _ = observer
            .expect_on_event()
            .with(eq(event))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
    }

    let mut l2 = level("L2", 8, 2, 16);
    l2.set_observer(observer);
    let (mut l1, mut below) = pair(level("L1", 8, 1, 8), l2);

    l1.read(0, &mut below);
    l1.write(0, &mut below);
    l1.read(8, &mut below);

    assert_eq!(l1.stats().writebacks, 1);
    assert!(below[0].is_dirty(0));
}

#[test]
fn writeback_of_absent_block_misses_below() {
    // L1 has two direct-mapped sets; L2 holds a single line, so pulling 8 drops 0 from L2.
    let (mut l1, mut below) = pair(level("L1", 8, 1, 16), level("L2", 8, 1, 8));
    l1.read(0, &mut below);
    l1.write(0, &mut below);
    l1.read(8, &mut below);
    assert!(!below[0].contains(0));

    let l2_log = EventLog::new();
    below[0].set_observer(l2_log.observer());
    l1.read(16, &mut below);

    assert_eq!(
        l2_log.take(),
        vec![
            CacheEvent::WriteMiss(0),
            CacheEvent::ReadMiss(16),
            CacheEvent::Eviction(8),
        ]
    );
    assert!(!below[0].contains(0));
}

// ══════════════════════════════════════════════════════════
// 4. Block-size mismatches
// ══════════════════════════════════════════════════════════

/// 16-byte L1 blocks over 8-byte L2 blocks: one L1 miss is two L2 reads.
#[test]
fn wide_block_miss_splits_into_narrow_reads() {
    let (mut l1, mut below) = pair(level("L1", 16, 1, 16), level("L2", 8, 2, 32));
    let l2_log = EventLog::new();
    below[0].set_observer(l2_log.observer());

    l1.read(0, &mut below);
    l1.read(4, &mut below);
    l1.read(16, &mut below);

    assert_eq!(
        l2_log.take(),
        vec![
            CacheEvent::ReadMiss(0),
            CacheEvent::ReadMiss(8),
            CacheEvent::NoAction(4),
            CacheEvent::ReadMiss(16),
            CacheEvent::ReadMiss(24),
        ]
    );
}

/// 8-byte L1 blocks over a 32-byte L2 block: only the first L1 miss misses in L2.
#[test]
fn narrow_block_misses_share_one_wide_block() {
    let (mut l1, mut below) = pair(level("L1", 8, 1, 8), level("L2", 32, 1, 32));
    let l2_log = EventLog::new();
    below[0].set_observer(l2_log.observer());

    for addr in [0, 8, 16, 24] {
        l1.read(addr, &mut below);
    }

    assert_eq!(
        l2_log.take(),
        vec![
            CacheEvent::ReadMiss(0),
            CacheEvent::ReadHit(8),
            CacheEvent::ReadHit(16),
            CacheEvent::ReadHit(24),
        ]
    );
}

#[test]
fn read_range_steps_by_own_block_size() {
    let mut l2 = level("L2", 8, 4, 64);
    let log = EventLog::new();
    l2.set_observer(log.observer());

    l2.read_range(0..32, &mut []);

    assert_eq!(
        log.take(),
        vec![
            CacheEvent::ReadMiss(0),
            CacheEvent::ReadMiss(8),
            CacheEvent::ReadMiss(16),
            CacheEvent::ReadMiss(24),
        ]
    );
}

#[test]
fn top_of_address_space_is_reachable() {
    let (mut l1, mut below) = pair(level("L1", 8, 2, 32), level("L2", 16, 4, 128));
    let l2_log = EventLog::new();
    below[0].set_observer(l2_log.observer());

    l1.read(0xFFFF_FFFF, &mut below);
    l1.write(0xFFFF_FFF0, &mut below);

    assert!(l1.contains(0xFFFF_FFF8));
    assert_eq!(
        l2_log.take(),
        vec![
            CacheEvent::ReadMiss(0xFFFF_FFF8),
            CacheEvent::WriteHit(0xFFFF_FFF0),
        ]
    );
}

// ══════════════════════════════════════════════════════════
// 5. Passthrough sink and chain end
// ══════════════════════════════════════════════════════════

#[test]
fn passthrough_absorbs_everything() {
    let mut sink = CacheLevel::passthrough("memory");
    let log = EventLog::new();
    sink.set_observer(log.observer());

    sink.read(0x10, &mut []);
    sink.write(0x10, &mut []);
    sink.read_range(0..64, &mut []);
    sink.write_range(0..64, &mut []);
    sink.no_action(0x10, &mut []);

    assert!(sink.is_passthrough());
    assert!(sink.geometry().is_none());
    assert!(!sink.contains(0x10));
    assert!(log.take().is_empty());
    assert_eq!(sink.stats(), &LevelStats::default());
}

#[test]
fn level_without_next_still_classifies() {
    let mut l1 = level("L1", 8, 2, 32);
    l1.read(0, &mut []);
    l1.read(0, &mut []);
    l1.write(64, &mut []);
    assert_eq!(l1.stats().read_misses, 1);
    assert_eq!(l1.stats().read_hits, 1);
    assert_eq!(l1.stats().write_misses, 1);
}

// ══════════════════════════════════════════════════════════
// 6. Properties
// ══════════════════════════════════════════════════════════

proptest! {
    /// Every set of both levels stays within its associativity.
    #[test]
    fn occupancy_never_exceeds_ways(
        accesses in prop::collection::vec((any::<bool>(), 0u32..512), 0..300)
    ) {
        let (mut l1, mut below) = pair(level("L1", 8, 2, 32), level("L2", 16, 4, 128));
        for (is_write, addr) in accesses {
            if is_write {
                l1.write(addr, &mut below);
            } else {
                l1.read(addr, &mut below);
            }
            for set in l1.sets().iter().chain(below[0].sets()) {
                prop_assert!(set.occupied() <= set.capacity());
            }
        }
    }

    /// A write to a block that was never read is never resident afterwards.
    #[test]
    fn writes_alone_never_allocate(addrs in prop::collection::vec(any::<u32>(), 1..50)) {
        let (mut l1, mut below) = pair(level("L1", 8, 2, 32), level("L2", 16, 4, 128));
        for &addr in &addrs {
            l1.write(addr, &mut below);
        }
        for &addr in &addrs {
            prop_assert!(!l1.contains(addr));
            prop_assert!(!below[0].contains(addr));
        }
    }
}
