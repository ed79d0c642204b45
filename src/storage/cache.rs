//! Block Cache
//!
//! Bounded set of decoded blocks with least-recently-used replacement.

use std::collections::{HashMap, VecDeque};

/// A decoded block held in memory
#[derive(Debug)]
pub(crate) struct ResidentBlock<T> {
    pub items: Vec<T>,
    /// Modified since it was last written to the spill file
    pub dirty: bool,
}

/// LRU cache of resident blocks, keyed by block index
pub(crate) struct BlockCache<T> {
    blocks: HashMap<usize, ResidentBlock<T>>,
    /// Block indices, least recently used first
    recency: VecDeque<usize>,
    capacity: usize,
}

impl<T> BlockCache<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            blocks: HashMap::with_capacity(capacity),
            recency: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Look at a block without changing its recency
    pub fn peek(&self, index: usize) -> Option<&ResidentBlock<T>> {
        self.blocks.get(&index)
    }

    /// Mutable access without changing recency
    pub fn peek_mut(&mut self, index: usize) -> Option<&mut ResidentBlock<T>> {
        self.blocks.get_mut(&index)
    }

    /// Mutable access, marking the block most recently used
    pub fn get_mut(&mut self, index: usize) -> Option<&mut ResidentBlock<T>> {
        if self.blocks.contains_key(&index) {
            self.touch(index);
        }
        self.blocks.get_mut(&index)
    }

    /// Block that `insert(index, ..)` would evict, if any
    pub fn victim_for(&self, index: usize) -> Option<usize> {
        if self.blocks.contains_key(&index) || self.blocks.len() < self.capacity {
            return None;
        }
        self.recency.front().copied()
    }

    /// Insert a block as most recently used, evicting the least recently
    /// used one when full. Returns the evicted block.
    pub fn insert(
        &mut self,
        index: usize,
        block: ResidentBlock<T>,
    ) -> Option<(usize, ResidentBlock<T>)> {
        let evicted = match self.victim_for(index) {
            Some(victim) => self.remove(victim).map(|b| (victim, b)),
            None => None,
        };

        self.blocks.insert(index, block);
        self.touch(index);
        evicted
    }

    pub fn remove(&mut self, index: usize) -> Option<ResidentBlock<T>> {
        self.recency.retain(|&i| i != index);
        self.blocks.remove(&index)
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.recency.clear();
    }

    /// Indices of blocks that still need writing back
    pub fn dirty_indices(&self) -> Vec<usize> {
        let mut dirty: Vec<usize> = self
            .blocks
            .iter()
            .filter(|(_, b)| b.dirty)
            .map(|(&i, _)| i)
            .collect();
        dirty.sort_unstable();
        dirty
    }

    fn touch(&mut self, index: usize) {
        self.recency.retain(|&i| i != index);
        self.recency.push_back(index);
    }
}
