//! Tests for cursors, positions and iteration
//!
//! These tests verify:
//! - Random-access cursor arithmetic and reads
//! - Writes through CursorMut
//! - Detached positions surviving migration
//! - Cross-sequence comparisons being rejected
//! - Forward, reverse and exact-size iteration in both stores

use std::cmp::Ordering;

use tiervec::{Cursor, Residency, TierError, TierVec};

use crate::common::{contents, setup_small_config, setup_u32_vec};

fn filled_vec(count: u32) -> (tempfile::TempDir, TierVec<u32>) {
    let (temp, config) = setup_small_config(16);
    let vec = TierVec::from_iter_with((0..count).map(|i| i * 10), config).unwrap();
    (temp, vec)
}

// =============================================================================
// Cursor Tests
// =============================================================================

#[test]
fn test_begin_end_distance_is_len() {
    let (_temp, vec) = filled_vec(6);

    let begin = vec.begin();
    let end = vec.end();
    assert_eq!(end.offset_from(&begin).unwrap(), 6);
    assert_eq!(begin.offset_from(&end).unwrap(), -6);
    assert!(begin < end);
}

#[test]
fn test_cursor_arithmetic() {
    let (_temp, vec) = filled_vec(6);

    let mut cursor = vec.begin() + 2;
    assert_eq!(cursor.get().unwrap(), 20);

    cursor += 3;
    assert_eq!(cursor.get().unwrap(), 50);
    assert_eq!(cursor.get_at(-5).unwrap(), 0);

    cursor -= 1;
    assert_eq!(cursor.offset(), 4);

    cursor.step_back();
    cursor.step_back();
    assert_eq!((cursor - 1).get().unwrap(), 10);

    cursor.step_forward();
    assert_eq!(cursor.get().unwrap(), 30);
}

#[test]
fn test_end_cursor_read_fails() {
    let (_temp, vec) = filled_vec(3);

    let end = vec.end();
    assert!(matches!(end.get(), Err(TierError::IndexOutOfBounds { .. })));
    assert_eq!(end.get_at(-1).unwrap(), 20);
}

#[test]
fn test_cursor_equality_within_sequence() {
    let (_temp, vec) = filled_vec(4);

    assert_eq!(vec.begin() + 4, vec.end());
    assert_ne!(vec.begin(), vec.end());
    assert_eq!(vec.cursor_at(2), vec.begin() + 2);
}

#[test]
fn test_cursors_of_different_sequences_do_not_compare() {
    let (_temp, a) = filled_vec(4);
    let b = a.try_clone().unwrap();

    let ca = a.begin();
    let cb = b.begin();

    assert!(ca != cb);
    assert_eq!(ca.partial_cmp(&cb), None);
    assert!(matches!(ca.offset_from(&cb), Err(TierError::ForeignCursor)));
}

#[test]
fn test_cursor_reads_through_secondary_store() {
    let (_temp, vec) = filled_vec(20);
    assert_eq!(vec.residency(), Residency::Secondary);

    let mut cursor = vec.begin();
    let mut seen = Vec::new();
    while cursor != vec.end() {
        seen.push(cursor.get().unwrap());
        cursor.step_forward();
    }
    assert_eq!(seen, contents(&vec));
}

// =============================================================================
// CursorMut Tests
// =============================================================================

#[test]
fn test_cursor_mut_writes() {
    let (_temp, mut vec) = filled_vec(8);

    {
        let mut cursor = vec.cursor_mut_at(1);
        cursor.set(11).unwrap();
        cursor += 2;
        cursor.set(33).unwrap();
        cursor.set_at(-3, 1).unwrap();
        assert_eq!(cursor.as_cursor().get().unwrap(), 33);
    }

    assert_eq!(contents(&vec), vec![1, 11, 20, 33, 40, 50, 60, 70]);
}

#[test]
fn test_cursor_mut_into_cursor() {
    let (_temp, mut vec) = filled_vec(3);

    let cursor: Cursor<'_, u32> = vec.cursor_mut_at(2).into();
    assert_eq!(cursor.get().unwrap(), 20);
}

// =============================================================================
// Position Tests
// =============================================================================

#[test]
fn test_position_survives_promotion() {
    let (_temp, mut vec) = setup_u32_vec();
    vec.assign([5, 6, 7]).unwrap();

    let position = vec.begin().detach() + 2;
    assert_eq!(vec.residency(), Residency::Primary);

    vec.push(8).unwrap();
    assert_eq!(vec.residency(), Residency::Secondary);

    let cursor = vec.attach(position).unwrap();
    assert_eq!(cursor.get().unwrap(), 7);
}

#[test]
fn test_position_survives_demotion() {
    let (_temp, mut vec) = setup_u32_vec();
    vec.assign(0..4).unwrap();
    let position = vec.position_at(1);

    vec.pop().unwrap();
    assert_eq!(vec.residency(), Residency::Primary);

    let mut cursor = vec.attach_mut(position).unwrap();
    cursor.set(100).unwrap();
    assert_eq!(vec.get(1).unwrap(), 100);
}

#[test]
fn test_position_from_other_sequence_is_rejected() {
    let (_temp, a) = filled_vec(4);
    let b = a.try_clone().unwrap();

    let position = a.position_at(0);
    assert!(matches!(b.attach(position), Err(TierError::ForeignCursor)));
    assert_eq!(position.partial_cmp(&b.position_at(0)), None);
    assert!(matches!(
        position.offset_from(&b.position_at(0)),
        Err(TierError::ForeignCursor)
    ));
}

#[test]
fn test_position_ordering() {
    let (_temp, vec) = filled_vec(4);

    let first = vec.position_at(1);
    let second = vec.position_at(3);
    assert_eq!(first.partial_cmp(&second), Some(Ordering::Less));
    assert_eq!(second.offset_from(&first).unwrap(), 2);
    assert_eq!(second - 2, first);
}

#[test]
fn test_swap_keeps_identity() {
    let (_temp, config) = setup_small_config(16);
    let mut a: TierVec<u32> = TierVec::from_iter_with(0..3, config.clone()).unwrap();
    let mut b: TierVec<u32> = TierVec::from_iter_with(10..13, config).unwrap();

    let position = a.position_at(0);
    a.swap(&mut b);

    // The position still belongs to `a`, which now holds b's elements
    assert_eq!(a.attach(position).unwrap().get().unwrap(), 10);
    assert!(b.attach(position).is_err());
}

// =============================================================================
// Iterator Tests
// =============================================================================

#[test]
fn test_iter_forward_and_reverse() {
    let (_temp, vec) = filled_vec(10);
    assert_eq!(vec.residency(), Residency::Secondary);

    let forward: Vec<u32> = vec.iter().map(Result::unwrap).collect();
    let mut reverse: Vec<u32> = vec.iter().rev().map(Result::unwrap).collect();
    reverse.reverse();

    assert_eq!(forward, reverse);
    assert_eq!(forward, (0..10).map(|i| i * 10).collect::<Vec<_>>());
}

#[test]
fn test_iter_is_exact_size() {
    let (_temp, vec) = filled_vec(7);

    let mut iter = vec.iter();
    assert_eq!(iter.len(), 7);
    iter.next();
    iter.next_back();
    assert_eq!(iter.len(), 5);
    assert_eq!(iter.nth(4).unwrap().unwrap(), 50);
    assert!(iter.next().is_none());
    assert!(iter.next_back().is_none());
}

#[test]
fn test_into_iterator_for_reference() {
    let (_temp, vec) = filled_vec(3);

    let mut total = 0;
    for value in &vec {
        total += value.unwrap();
    }
    assert_eq!(total, 30);
}

#[test]
fn test_empty_iter() {
    let (_temp, vec) = setup_u32_vec();

    assert_eq!(vec.iter().count(), 0);
    assert_eq!(vec.begin(), vec.end());
}
