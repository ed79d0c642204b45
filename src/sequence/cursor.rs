//! Cursors
//!
//! Three ways to point into a sequence:
//! - [`Cursor`]: shared, random-access, read-only
//! - [`CursorMut`]: exclusive, random-access, read/write
//! - [`Position`]: detached (sequence identity + offset), survives mutation
//!   and migration, re-bound with `TierVec::attach`
//!
//! Cursors hold an offset, never an element reference, so they keep working
//! whichever store holds the elements. Comparing or subtracting cursors of
//! two different sequences is rejected.

use std::cmp::Ordering;
use std::iter::FusedIterator;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::ptr;

use crate::backend::{Backend, MemoryVec};
use crate::error::{Result, TierError};
use crate::storage::DiskVec;

use super::vector::{SequenceId, TierVec};

// =============================================================================
// Position
// =============================================================================

/// Detached offset into one particular sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    owner: SequenceId,
    offset: usize,
}

impl Position {
    pub(crate) fn new(owner: SequenceId, offset: usize) -> Self {
        Self { owner, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub(crate) fn owner(&self) -> SequenceId {
        self.owner
    }

    /// Signed distance from `origin`; both must come from the same sequence
    pub fn offset_from(&self, origin: &Position) -> Result<isize> {
        if self.owner != origin.owner {
            return Err(TierError::ForeignCursor);
        }
        Ok(distance(self.offset, origin.offset))
    }
}

/// Positions of different sequences are unordered
impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.owner != other.owner {
            return None;
        }
        Some(self.offset.cmp(&other.offset))
    }
}

impl Add<isize> for Position {
    type Output = Position;

    fn add(self, n: isize) -> Position {
        Position::new(self.owner, self.offset.wrapping_add_signed(n))
    }
}

impl Sub<isize> for Position {
    type Output = Position;

    fn sub(self, n: isize) -> Position {
        Position::new(self.owner, self.offset.wrapping_add_signed(n.wrapping_neg()))
    }
}

// =============================================================================
// Cursor
// =============================================================================

/// Shared random-access cursor
///
/// Reading at an offset outside `0..len` fails with `IndexOutOfBounds`;
/// moving there does not.
pub struct Cursor<'a, T, P = MemoryVec<T>, S = DiskVec<T>> {
    vec: &'a TierVec<T, P, S>,
    offset: usize,
}

impl<'a, T, P, S> Cursor<'a, T, P, S>
where
    T: Clone,
    P: Backend<T>,
    S: Backend<T>,
{
    pub(crate) fn new(vec: &'a TierVec<T, P, S>, offset: usize) -> Self {
        Self { vec, offset }
    }

    /// Element under the cursor
    pub fn get(&self) -> Result<T> {
        self.vec.get(self.offset)
    }

    /// Element `n` places away from the cursor
    pub fn get_at(&self, n: isize) -> Result<T> {
        self.vec.get(self.offset.wrapping_add_signed(n))
    }

    pub fn step_forward(&mut self) {
        self.offset = self.offset.wrapping_add(1);
    }

    pub fn step_back(&mut self) {
        self.offset = self.offset.wrapping_sub(1);
    }

    /// Signed distance from `origin`; both must point into the same sequence
    pub fn offset_from(&self, origin: &Cursor<'_, T, P, S>) -> Result<isize> {
        if !ptr::eq(self.vec, origin.vec) {
            return Err(TierError::ForeignCursor);
        }
        Ok(distance(self.offset, origin.offset))
    }

    /// Release the borrow, keeping the sequence identity and offset
    pub fn detach(&self) -> Position {
        self.vec.position_at(self.offset)
    }
}

impl<'a, T, P, S> Cursor<'a, T, P, S> {
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The sequence this cursor points into
    pub fn sequence(&self) -> &'a TierVec<T, P, S> {
        self.vec
    }
}

impl<'a, T, P, S> Clone for Cursor<'a, T, P, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T, P, S> Copy for Cursor<'a, T, P, S> {}

impl<'a, T, P, S> PartialEq for Cursor<'a, T, P, S> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.vec, other.vec) && self.offset == other.offset
    }
}

/// Cursors of different sequences are unordered
impl<'a, T, P, S> PartialOrd for Cursor<'a, T, P, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if !ptr::eq(self.vec, other.vec) {
            return None;
        }
        Some(self.offset.cmp(&other.offset))
    }
}

impl<'a, T, P, S> Add<isize> for Cursor<'a, T, P, S> {
    type Output = Self;

    fn add(mut self, n: isize) -> Self {
        self += n;
        self
    }
}

impl<'a, T, P, S> Sub<isize> for Cursor<'a, T, P, S> {
    type Output = Self;

    fn sub(mut self, n: isize) -> Self {
        self -= n;
        self
    }
}

impl<'a, T, P, S> AddAssign<isize> for Cursor<'a, T, P, S> {
    fn add_assign(&mut self, n: isize) {
        self.offset = self.offset.wrapping_add_signed(n);
    }
}

impl<'a, T, P, S> SubAssign<isize> for Cursor<'a, T, P, S> {
    fn sub_assign(&mut self, n: isize) {
        self.offset = self.offset.wrapping_add_signed(n.wrapping_neg());
    }
}

impl<'a, T, P, S> std::fmt::Debug for Cursor<'a, T, P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor").field("offset", &self.offset).finish()
    }
}

// =============================================================================
// CursorMut
// =============================================================================

/// Exclusive random-access cursor that can overwrite elements
///
/// Writes go through `TierVec::set`, so they never move the sequence
/// between stores.
pub struct CursorMut<'a, T, P = MemoryVec<T>, S = DiskVec<T>> {
    vec: &'a mut TierVec<T, P, S>,
    offset: usize,
}

impl<'a, T, P, S> CursorMut<'a, T, P, S>
where
    T: Clone,
    P: Backend<T>,
    S: Backend<T>,
{
    pub(crate) fn new(vec: &'a mut TierVec<T, P, S>, offset: usize) -> Self {
        Self { vec, offset }
    }

    pub fn get(&self) -> Result<T> {
        self.vec.get(self.offset)
    }

    pub fn get_at(&self, n: isize) -> Result<T> {
        self.vec.get(self.offset.wrapping_add_signed(n))
    }

    /// Overwrite the element under the cursor
    pub fn set(&mut self, value: T) -> Result<()> {
        self.vec.set(self.offset, value)
    }

    /// Overwrite the element `n` places away from the cursor
    pub fn set_at(&mut self, n: isize, value: T) -> Result<()> {
        self.vec.set(self.offset.wrapping_add_signed(n), value)
    }

    pub fn step_forward(&mut self) {
        self.offset = self.offset.wrapping_add(1);
    }

    pub fn step_back(&mut self) {
        self.offset = self.offset.wrapping_sub(1);
    }

    pub fn detach(&self) -> Position {
        self.vec.position_at(self.offset)
    }

    /// Shared view at the same offset for as long as this cursor is borrowed
    pub fn as_cursor(&self) -> Cursor<'_, T, P, S> {
        Cursor::new(self.vec, self.offset)
    }
}

impl<'a, T, P, S> CursorMut<'a, T, P, S> {
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a, T, P, S> From<CursorMut<'a, T, P, S>> for Cursor<'a, T, P, S> {
    fn from(cursor: CursorMut<'a, T, P, S>) -> Self {
        Cursor {
            vec: cursor.vec,
            offset: cursor.offset,
        }
    }
}

impl<'a, T, P, S> AddAssign<isize> for CursorMut<'a, T, P, S> {
    fn add_assign(&mut self, n: isize) {
        self.offset = self.offset.wrapping_add_signed(n);
    }
}

impl<'a, T, P, S> SubAssign<isize> for CursorMut<'a, T, P, S> {
    fn sub_assign(&mut self, n: isize) {
        self.offset = self.offset.wrapping_add_signed(n.wrapping_neg());
    }
}

impl<'a, T, P, S> std::fmt::Debug for CursorMut<'a, T, P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorMut")
            .field("offset", &self.offset)
            .finish()
    }
}

// =============================================================================
// Iter
// =============================================================================

/// Double-ended iterator over copies of a sequence's elements
pub struct Iter<'a, T, P = MemoryVec<T>, S = DiskVec<T>> {
    vec: &'a TierVec<T, P, S>,
    /// Next offset from the front
    front: usize,
    /// One past the next offset from the back
    back: usize,
}

impl<'a, T, P, S> Iter<'a, T, P, S>
where
    T: Clone,
    P: Backend<T>,
    S: Backend<T>,
{
    pub(crate) fn new(vec: &'a TierVec<T, P, S>) -> Self {
        Self {
            vec,
            front: 0,
            back: vec.len(),
        }
    }
}

impl<'a, T, P, S> Iterator for Iter<'a, T, P, S>
where
    T: Clone,
    P: Backend<T>,
    S: Backend<T>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let item = self.vec.get(self.front);
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl<'a, T, P, S> DoubleEndedIterator for Iter<'a, T, P, S>
where
    T: Clone,
    P: Backend<T>,
    S: Backend<T>,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.vec.get(self.back))
    }
}

impl<'a, T, P, S> ExactSizeIterator for Iter<'a, T, P, S>
where
    T: Clone,
    P: Backend<T>,
    S: Backend<T>,
{
}

impl<'a, T, P, S> FusedIterator for Iter<'a, T, P, S>
where
    T: Clone,
    P: Backend<T>,
    S: Backend<T>,
{
}

fn distance(to: usize, from: usize) -> isize {
    (to as isize).wrapping_sub(from as isize)
}
