//! Disk Vector Iterator
//!
//! Sequential iteration over all elements of a DiskVec, one block at a time.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

use super::DiskVec;

/// Iterator over DiskVec elements in index order
///
/// Blocks that are not resident are read straight from the spill file and
/// not admitted to the cache, so a full scan leaves the resident set alone.
pub struct DiskIter<'a, T> {
    vec: &'a DiskVec<T>,
    /// Next block to load
    next_block: usize,
    /// Elements of the current block not yet yielded
    current: std::vec::IntoIter<T>,
    /// Elements left in the whole scan
    remaining: usize,
}

impl<'a, T> DiskIter<'a, T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    pub(super) fn new(vec: &'a DiskVec<T>) -> Self {
        Self {
            vec,
            next_block: 0,
            current: Vec::new().into_iter(),
            remaining: vec.len(),
        }
    }
}

impl<'a, T> Iterator for DiskIter<'a, T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        if let Some(value) = self.current.next() {
            self.remaining -= 1;
            return Some(Ok(value));
        }

        match self.vec.snapshot_block(self.next_block) {
            Ok(items) => {
                self.next_block += 1;
                self.current = items.into_iter();
                let value = self.current.next()?;
                self.remaining -= 1;
                Some(Ok(value))
            }
            Err(e) => {
                // Stop the scan after reporting the failure
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for DiskIter<'a, T> where T: Serialize + DeserializeOwned + Clone {}
