//! Backend Module
//!
//! The capability a store must offer to hold a TierVec's elements.
//!
//! ## Responsibilities
//! - Element count and capacity bookkeeping
//! - Push/pop at the tail, indexed get/set
//! - Full-range replace and bulk append from a fallible source
//! - Forward iteration, used to drive migration copies
//!
//! Two implementations ship with the crate: [`MemoryVec`] (primary, in memory)
//! and [`DiskVec`](crate::storage::DiskVec) (secondary, spill file).
//! Access is by value because a disk store cannot lend references into
//! blocks that may be evicted.

mod memory;

pub use memory::{MemoryIter, MemoryVec};

use crate::config::Config;
use crate::error::Result;

/// A sequence store the tiering policy can move elements into and out of
pub trait Backend<T>: Sized {
    /// Forward iterator over owned copies of the elements
    type Iter<'a>: Iterator<Item = Result<T>>
    where
        Self: 'a;

    /// Open a fresh, empty store
    fn open(config: &Config) -> Result<Self>;

    /// Deep copy of this store
    fn try_clone(&self) -> Result<Self>;

    /// Number of elements held
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements the store can hold without growing
    fn capacity(&self) -> usize;

    /// Make room for at least `additional` more elements
    fn reserve(&mut self, additional: usize) -> Result<()>;

    /// Truncate, or extend with default values, to exactly `new_len`
    fn resize(&mut self, new_len: usize) -> Result<()>;

    fn clear(&mut self) -> Result<()>;

    fn push(&mut self, value: T) -> Result<()>;

    /// Remove the last element; `None` when empty
    fn pop(&mut self) -> Result<Option<T>>;

    /// Copy of the element at `index`
    fn get(&self, index: usize) -> Result<T>;

    /// Overwrite the element at `index`
    fn set(&mut self, index: usize, value: T) -> Result<()>;

    /// Replace the whole contents with `items`, in order.
    ///
    /// Stops at the first `Err` item; the store then holds the prefix
    /// copied so far.
    fn try_assign<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<T>>;

    /// Append `items` at the end, in order. Stops at the first `Err` item.
    fn try_extend<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<T>>;

    fn iter(&self) -> Self::Iter<'_>;
}
