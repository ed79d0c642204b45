//! In-memory backend
//!
//! `MemoryVec<T>` is the primary store: amortized O(1) push, O(1) indexed
//! access. It wraps a `Vec<T>` so the by-value `Backend` methods never shadow
//! the slice methods of a plain `Vec`.

use std::slice;

use crate::config::Config;
use crate::error::{Result, TierError};

use super::Backend;

/// Primary store holding every element in a `Vec`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryVec<T> {
    items: Vec<T>,
}

impl<T> MemoryVec<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for MemoryVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for MemoryVec<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T: Clone + Default> Backend<T> for MemoryVec<T> {
    type Iter<'a> = MemoryIter<'a, T> where Self: 'a;

    fn open(_config: &Config) -> Result<Self> {
        Ok(Self::new())
    }

    fn try_clone(&self) -> Result<Self> {
        Ok(self.clone())
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn capacity(&self) -> usize {
        self.items.capacity()
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        self.items.reserve(additional);
        Ok(())
    }

    fn resize(&mut self, new_len: usize) -> Result<()> {
        self.items.resize(new_len, T::default());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.items.clear();
        Ok(())
    }

    fn push(&mut self, value: T) -> Result<()> {
        self.items.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<Option<T>> {
        Ok(self.items.pop())
    }

    fn get(&self, index: usize) -> Result<T> {
        self.items
            .as_slice()
            .get(index)
            .cloned()
            .ok_or(TierError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            })
    }

    fn set(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.items.len();
        match self.items.as_mut_slice().get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(TierError::IndexOutOfBounds { index, len }),
        }
    }

    fn try_assign<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<T>>,
    {
        self.items.clear();
        self.try_extend(items)
    }

    fn try_extend<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<T>>,
    {
        let items = items.into_iter();
        self.items.reserve(items.size_hint().0);
        for item in items {
            self.items.push(item?);
        }
        Ok(())
    }

    fn iter(&self) -> Self::Iter<'_> {
        MemoryIter {
            inner: self.items.as_slice().iter(),
        }
    }
}

/// Iterator over a `MemoryVec`, yielding owned copies
pub struct MemoryIter<'a, T> {
    inner: slice::Iter<'a, T>,
}

impl<'a, T: Clone> Iterator for MemoryIter<'a, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().cloned().map(Ok)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T: Clone> ExactSizeIterator for MemoryIter<'a, T> {}
