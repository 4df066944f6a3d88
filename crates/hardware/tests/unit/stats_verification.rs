//! # Statistics Verification
//!
//! Checks that per-level counters track cache events exactly, that derived
//! rates are computed correctly, and that snapshots copy the hierarchy's state.

use cachesim_core::common::AccessType;
use cachesim_core::core::units::cache::CacheEvent;
use cachesim_core::stats::{LevelStats, STATS_SECTIONS, SimStats};
use proptest::prelude::*;

use crate::common::harness::two_level;

#[test]
fn record_routes_each_event_kind() {
    let mut stats = LevelStats::default();
    for event in [
        CacheEvent::ReadHit(0),
        CacheEvent::ReadMiss(0),
        CacheEvent::ReadMiss(8),
        CacheEvent::WriteHit(0),
        CacheEvent::WriteMiss(0),
        CacheEvent::NoAction(0),
        CacheEvent::Eviction(0),
    ] {
        stats.record(event);
    }
    assert_eq!(
        stats,
        LevelStats {
            read_hits: 1,
            read_misses: 2,
            write_hits: 1,
            write_misses: 1,
            no_actions: 1,
            evictions: 1,
            writebacks: 0,
        }
    );
    assert_eq!(stats.hits(), 2);
    assert_eq!(stats.misses(), 3);
}

#[test]
fn hit_rate_ignores_no_actions() {
    let stats = LevelStats {
        read_hits: 3,
        read_misses: 1,
        no_actions: 100,
        ..LevelStats::default()
    };
    assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    assert!(LevelStats::default().hit_rate().abs() < f64::EPSILON);
}

#[test]
fn access_totals() {
    let mut stats = SimStats::default();
    stats.record_access(AccessType::Read);
    stats.record_access(AccessType::Write);
    stats.record_access(AccessType::Read);
    assert_eq!((stats.reads, stats.writes, stats.accesses()), (2, 1, 3));
}

#[test]
fn snapshot_copies_level_names_and_counters() {
    let mut h = two_level();
    let _ = h.read(0);
    let _ = h.read(0);

    let mut stats = SimStats::default();
    stats.snapshot(&h);

    assert_eq!(stats.levels.len(), 2);
    assert_eq!(stats.levels[0].0, "L1");
    assert_eq!(stats.levels[0].1.read_hits, 1);
    assert_eq!(stats.levels[1].1, *h.level(1).unwrap().stats());
}

#[test]
fn printing_every_section_succeeds() {
    let mut h = two_level();
    let _ = h.write(0);
    let mut stats = SimStats::default();
    stats.snapshot(&h);

    stats.print();
    for section in STATS_SECTIONS {
        stats.print_sections(&[(*section).to_owned()]);
    }
}

proptest! {
    /// Each level's hits + misses + no-actions equals the requests it received.
    #[test]
    fn l1_classifies_every_access(
        accesses in prop::collection::vec((any::<bool>(), 0u32..1024), 1..200)
    ) {
        let mut h = two_level();
        for &(is_write, addr) in &accesses {
            let _ = if is_write { h.write(addr) } else { h.read(addr) };
        }
        let l1 = h.level(0).unwrap().stats();
        prop_assert_eq!(l1.hits() + l1.misses(), accesses.len() as u64);
        prop_assert_eq!(l1.no_actions, 0);
        prop_assert!(l1.writebacks <= l1.evictions);
    }
}
