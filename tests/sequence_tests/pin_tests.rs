//! Tests for pinning
//!
//! These tests verify:
//! - Construction-time pins
//! - pin_to_primary / pin_to_secondary moving and locking the sequence
//! - unpin re-evaluating the store

use tiervec::{Config, Residency, TierVec};

use crate::common::{contents, setup_small_config, setup_u32_vec};

// =============================================================================
// Construction Pin Tests
// =============================================================================

#[test]
fn test_construction_pin_secondary_when_small() {
    let (_temp, config) = setup_small_config(16);
    let config = Config {
        pin_secondary: true,
        ..config
    };

    let mut vec: TierVec<u32> = TierVec::with_config(config).unwrap();
    assert_eq!(vec.residency(), Residency::Secondary);
    assert_eq!(vec.pinned(), Some(Residency::Secondary));

    vec.push(1).unwrap();
    vec.pop().unwrap();
    assert_eq!(vec.residency(), Residency::Secondary);
}

#[test]
fn test_construction_pin_primary_when_large_starts_secondary() {
    let (_temp, config) = setup_small_config(16);
    let config = Config {
        pin_primary: true,
        ..config
    };

    // The initial size already meets the threshold, so the sequence cannot
    // start in memory even though it is pinned there
    let mut vec: TierVec<u32> = TierVec::with_len(10, config).unwrap();
    assert_eq!(vec.residency(), Residency::Secondary);
    assert_eq!(vec.pinned(), Some(Residency::Primary));
    assert_eq!(contents(&vec), vec![0; 10]);

    // The pin still blocks automatic moves in either direction
    vec.push(1).unwrap();
    assert_eq!(vec.residency(), Residency::Secondary);
    while vec.len() > 1 {
        vec.pop().unwrap();
    }
    assert_eq!(vec.residency(), Residency::Secondary);
}

#[test]
fn test_construction_pin_primary_when_small() {
    let (_temp, config) = setup_small_config(16);
    let config = Config {
        pin_primary: true,
        ..config
    };

    let mut vec: TierVec<u32> = TierVec::with_len(2, config).unwrap();
    assert_eq!(vec.residency(), Residency::Primary);

    for i in 0..10 {
        vec.push(i).unwrap();
    }
    assert_eq!(vec.residency(), Residency::Primary);
    assert_eq!(vec.len(), 12);
}

#[test]
fn test_construction_pin_primary_from_large_range() {
    let (_temp, config) = setup_small_config(16);
    let config = Config {
        pin_primary: true,
        ..config
    };

    let vec: TierVec<u32> = TierVec::from_iter_with(0..10, config).unwrap();
    assert_eq!(vec.residency(), Residency::Secondary);
    assert_eq!(vec.pinned(), Some(Residency::Primary));
    assert_eq!(contents(&vec), (0..10).collect::<Vec<_>>());
}

// =============================================================================
// Pin Control Tests
// =============================================================================

#[test]
fn test_pin_primary_blocks_promotion() {
    let (_temp, mut vec) = setup_u32_vec();
    vec.pin_to_primary().unwrap();

    for i in 0..20 {
        vec.push(i).unwrap();
    }
    assert_eq!(vec.residency(), Residency::Primary);
    assert_eq!(vec.pinned(), Some(Residency::Primary));
}

#[test]
fn test_pin_primary_demotes_large_sequence() {
    let (_temp, mut vec) = setup_u32_vec();
    vec.assign(0..10).unwrap();
    assert_eq!(vec.residency(), Residency::Secondary);

    vec.pin_to_primary().unwrap();
    assert_eq!(vec.residency(), Residency::Primary);
    assert_eq!(contents(&vec), (0..10).collect::<Vec<_>>());
}

#[test]
fn test_pin_secondary_promotes_small_sequence() {
    let (_temp, mut vec) = setup_u32_vec();
    vec.assign([1, 2]).unwrap();

    vec.pin_to_secondary().unwrap();
    assert_eq!(vec.residency(), Residency::Secondary);
    assert_eq!(contents(&vec), vec![1, 2]);
}

#[test]
fn test_repin_switches_store() {
    let (_temp, mut vec) = setup_u32_vec();
    vec.assign([1, 2]).unwrap();

    vec.pin_to_secondary().unwrap();
    vec.pin_to_primary().unwrap();
    assert_eq!(vec.residency(), Residency::Primary);
    assert_eq!(vec.pinned(), Some(Residency::Primary));
}

#[test]
fn test_clear_under_secondary_pin_stays_secondary() {
    let (_temp, mut vec) = setup_u32_vec();
    vec.assign(0..10).unwrap();
    vec.pin_to_secondary().unwrap();

    vec.clear().unwrap();
    assert!(vec.is_empty());
    assert_eq!(vec.residency(), Residency::Secondary);
}

#[test]
fn test_assign_under_pin_keeps_store() {
    let (_temp, mut vec) = setup_u32_vec();
    vec.pin_to_primary().unwrap();

    vec.assign(0..50).unwrap();
    assert_eq!(vec.residency(), Residency::Primary);
    assert_eq!(vec.len(), 50);
}

// =============================================================================
// Unpin Tests
// =============================================================================

#[test]
fn test_unpin_rebalances_large_sequence() {
    let (_temp, mut vec) = setup_u32_vec();
    vec.pin_to_primary().unwrap();
    vec.assign(0..10).unwrap();

    vec.unpin().unwrap();
    assert_eq!(vec.pinned(), None);
    assert_eq!(vec.residency(), Residency::Secondary);
    assert_eq!(contents(&vec), (0..10).collect::<Vec<_>>());
}

#[test]
fn test_unpin_rebalances_small_sequence() {
    let (_temp, mut vec) = setup_u32_vec();
    vec.pin_to_secondary().unwrap();
    vec.push(1).unwrap();

    vec.unpin().unwrap();
    assert_eq!(vec.residency(), Residency::Primary);

    // Automatic switching is back on
    vec.append([2, 3, 4]).unwrap();
    assert_eq!(vec.residency(), Residency::Secondary);
}
