//! Tests for the in-memory backend
//!
//! These tests verify:
//! - MemoryVec honors the Backend contract
//! - Errors from fallible sources stop bulk operations

use tiervec::{Backend, Config, MemoryVec, TierError};

fn open_vec() -> MemoryVec<u32> {
    MemoryVec::open(&Config::default()).unwrap()
}

fn collect(vec: &MemoryVec<u32>) -> Vec<u32> {
    vec.iter().map(Result::unwrap).collect()
}

#[test]
fn test_open_is_empty() {
    let vec = open_vec();
    assert!(vec.is_empty());
    assert!(vec.as_slice().is_empty());
}

#[test]
fn test_push_pop_get_set() {
    let mut vec = open_vec();
    vec.push(1).unwrap();
    vec.push(2).unwrap();

    vec.set(0, 10).unwrap();
    assert_eq!(vec.get(0).unwrap(), 10);
    assert_eq!(vec.pop().unwrap(), Some(2));
    assert_eq!(vec.pop().unwrap(), Some(10));
    assert_eq!(vec.pop().unwrap(), None);
}

#[test]
fn test_out_of_bounds_reports_length() {
    let mut vec = open_vec();
    vec.push(1).unwrap();

    assert!(matches!(
        vec.get(3),
        Err(TierError::IndexOutOfBounds { index: 3, len: 1 })
    ));
    assert!(matches!(
        vec.set(1, 0),
        Err(TierError::IndexOutOfBounds { index: 1, len: 1 })
    ));
}

#[test]
fn test_try_assign_replaces_contents() {
    let mut vec = MemoryVec::from(vec![9, 9, 9]);

    vec.try_assign((0..5).map(Ok)).unwrap();
    assert_eq!(collect(&vec), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_try_extend_stops_at_error() {
    let mut vec = MemoryVec::from(vec![1]);
    let items = vec![Ok(2), Err(TierError::Storage("gone".to_string())), Ok(4)];

    assert!(vec.try_extend(items).is_err());
    assert_eq!(collect(&vec), vec![1, 2]);
}

#[test]
fn test_resize_and_reserve() {
    let mut vec = open_vec();

    vec.resize(3).unwrap();
    assert_eq!(collect(&vec), vec![0, 0, 0]);

    vec.reserve(50).unwrap();
    assert!(vec.capacity() >= 53);

    vec.clear().unwrap();
    assert_eq!(vec.len(), 0);
}

#[test]
fn test_try_clone_is_deep() {
    let vec = MemoryVec::from(vec![1, 2, 3]);
    let mut copy = vec.try_clone().unwrap();

    copy.set(0, 100).unwrap();
    assert_eq!(vec.as_slice(), &[1, 2, 3]);
    assert_eq!(copy.into_inner(), vec![100, 2, 3]);
}

#[test]
fn test_iter_is_exact_size() {
    let vec = MemoryVec::from(vec![5, 6, 7]);
    let iter = vec.iter();
    assert_eq!(iter.len(), 3);
}
