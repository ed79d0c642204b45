//! Disk Vector
//!
//! Growable sequence whose elements live in spill file blocks, with a small
//! cache of decoded blocks in memory.
//!
//! ## Invariants
//! - Block `i` holds elements `[i * block_len, (i + 1) * block_len)`
//! - Every block below `block_count()` is resident, spilled, or both
//! - A resident dirty block supersedes its spilled frame

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::backend::Backend;
use crate::config::Config;
use crate::error::{Result, TierError};

use super::block::{decode_block, encode_block, BlockHandle};
use super::cache::{BlockCache, ResidentBlock};
use super::iterator::DiskIter;
use super::spill_file::SpillFile;

/// Disk-resident secondary store
///
/// ## Concurrency:
/// - `inner`: Mutex so that `get(&self)` can load and evict blocks
/// - Mutating methods take `&mut self` and bypass the lock via `get_mut`
pub struct DiskVec<T> {
    /// Number of elements
    len: usize,

    /// Elements per block
    block_len: usize,

    /// Blocks accounted for by `reserve`
    reserved_blocks: usize,

    /// Kept so copies open their own spill file with the same geometry
    config: Config,

    /// Spill file, block table and block cache
    inner: Mutex<Inner<T>>,
}

struct Inner<T> {
    spill: SpillFile,
    /// Spilled frame of each block (None = never written)
    table: Vec<Option<BlockHandle>>,
    cache: BlockCache<T>,
    block_len: usize,
}

impl<T> DiskVec<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Open an empty disk vector with its own spill file
    pub fn open(config: &Config) -> Result<Self> {
        if config.block_len == 0 || config.resident_blocks == 0 {
            return Err(TierError::InvalidConfiguration(format!(
                "block_len ({}) and resident_blocks ({}) must be at least 1",
                config.block_len, config.resident_blocks
            )));
        }
        let block_len_u32 = u32::try_from(config.block_len).map_err(|_| {
            TierError::InvalidConfiguration(format!(
                "block_len {} does not fit the spill file header",
                config.block_len
            ))
        })?;

        let spill = SpillFile::create(&config.spill_dir_or_default(), block_len_u32)?;

        Ok(Self {
            len: 0,
            block_len: config.block_len,
            reserved_blocks: 0,
            config: config.clone(),
            inner: Mutex::new(Inner {
                spill,
                table: Vec::new(),
                cache: BlockCache::new(config.resident_blocks),
                block_len: config.block_len,
            }),
        })
    }

    /// Shorten to `new_len` elements; no-op if already shorter
    pub fn truncate(&mut self, new_len: usize) -> Result<()> {
        if new_len >= self.len {
            return Ok(());
        }

        let keep = new_len.div_ceil(self.block_len);
        let inner = self.inner.get_mut();
        for index in (keep..inner.table.len()).rev() {
            inner.drop_block(index);
        }
        inner.table.truncate(keep);
        self.len = self.len.min(keep * self.block_len);

        let tail = new_len % self.block_len;
        if tail != 0 {
            inner.block_mut(keep - 1)?.truncate(tail);
        }
        self.len = new_len;
        Ok(())
    }

    /// Write every dirty resident block to the spill file
    pub fn flush(&mut self) -> Result<()> {
        let inner = self.inner.get_mut();
        for index in inner.cache.dirty_indices() {
            inner.flush_block(index)?;
        }
        Ok(())
    }

    /// Rewrite the spill file without superseded frames
    pub fn compact(&mut self) -> Result<()> {
        let inner = self.inner.get_mut();
        let Inner { spill, table, .. } = inner;
        spill.compact(table)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn block_len(&self) -> usize {
        self.block_len
    }

    /// Number of blocks backing the current elements
    pub fn block_count(&self) -> usize {
        self.len.div_ceil(self.block_len)
    }

    /// Number of decoded blocks currently in memory
    pub fn resident_block_count(&self) -> usize {
        self.inner.lock().cache.len()
    }

    /// Spill file size in bytes
    pub fn spill_file_size(&self) -> u64 {
        self.inner.lock().spill.file_size()
    }

    /// Bytes of superseded frames awaiting compaction
    pub fn garbage_bytes(&self) -> u64 {
        self.inner.lock().spill.garbage_bytes()
    }

    /// Copy of one block's elements, read from disk without caching it
    pub(super) fn snapshot_block(&self, index: usize) -> Result<Vec<T>> {
        self.inner.lock().snapshot(index)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len {
            return Err(TierError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(())
    }

    /// Write a full block straight to the spill file, then empty `chunk`
    fn spill_full_block(&mut self, chunk: &mut Vec<T>) -> Result<()> {
        let inner = self.inner.get_mut();
        let payload = encode_block(chunk)?;
        let handle = inner.spill.append(&payload)?;
        inner.table.push(Some(handle));
        self.len += chunk.len();
        chunk.clear();
        Ok(())
    }

    /// Adopt a partial block as the resident tail
    fn adopt_tail(&mut self, chunk: Vec<T>) -> Result<()> {
        let count = chunk.len();
        self.inner.get_mut().new_block(chunk)?;
        self.len += count;
        Ok(())
    }
}

impl<T> Inner<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Load a block into the cache if it is not already there
    fn ensure_resident(&mut self, index: usize) -> Result<()> {
        if self.cache.get_mut(index).is_some() {
            return Ok(());
        }

        let handle = self
            .table
            .as_slice()
            .get(index)
            .copied()
            .flatten()
            .ok_or_else(|| {
                TierError::Storage(format!("Block {} is neither resident nor spilled", index))
            })?;

        let payload = self.spill.read(&handle)?;
        let items = decode_block(&payload)?;
        self.admit(index, ResidentBlock { items, dirty: false })
    }

    /// Insert a block into the cache, writing back the victim first
    fn admit(&mut self, index: usize, block: ResidentBlock<T>) -> Result<()> {
        if let Some(victim) = self.cache.victim_for(index) {
            self.flush_block(victim)?;
            tracing::trace!("Evicting block {} from the resident set", victim);
        }
        self.cache.insert(index, block);
        Ok(())
    }

    /// Write a dirty resident block to the spill file and mark it clean
    fn flush_block(&mut self, index: usize) -> Result<()> {
        let block = match self.cache.peek_mut(index) {
            Some(block) if block.dirty => block,
            _ => return Ok(()),
        };

        let payload = encode_block(&block.items)?;
        let handle = self.spill.append(&payload)?;
        block.dirty = false;

        if let Some(slot) = self.table.get_mut(index) {
            if let Some(old) = slot.replace(handle) {
                self.spill.release(&old);
            }
        }
        tracing::trace!("Wrote block {} ({} bytes) to spill file", index, handle.len);

        if self.spill.should_compact() {
            self.spill.compact(&mut self.table)?;
        }
        Ok(())
    }

    /// Resident, dirty view of a block's elements
    fn block_mut(&mut self, index: usize) -> Result<&mut Vec<T>> {
        self.ensure_resident(index)?;
        let block = self.cache.get_mut(index).ok_or_else(|| {
            TierError::Storage(format!("Block {} vanished from the resident set", index))
        })?;
        block.dirty = true;
        Ok(&mut block.items)
    }

    /// Append a new tail block holding `items`
    fn new_block(&mut self, mut items: Vec<T>) -> Result<()> {
        let index = self.table.len();
        items.reserve(self.block_len.saturating_sub(items.len()));
        self.table.push(None);
        if let Err(e) = self.admit(index, ResidentBlock { items, dirty: true }) {
            self.table.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Forget a block both in memory and on disk
    fn drop_block(&mut self, index: usize) {
        self.cache.remove(index);
        if let Some(handle) = self.table.get_mut(index).and_then(Option::take) {
            self.spill.release(&handle);
        }
    }

    /// Copy of a block's elements; non-resident blocks are not cached
    fn snapshot(&mut self, index: usize) -> Result<Vec<T>> {
        if let Some(block) = self.cache.peek(index) {
            return Ok(block.items.clone());
        }

        let handle = self
            .table
            .as_slice()
            .get(index)
            .copied()
            .flatten()
            .ok_or_else(|| {
                TierError::Storage(format!("Block {} is neither resident nor spilled", index))
            })?;
        let payload = self.spill.read(&handle)?;
        decode_block(&payload)
    }
}

impl<T> Backend<T> for DiskVec<T>
where
    T: Serialize + DeserializeOwned + Clone + Default,
{
    type Iter<'a> = DiskIter<'a, T> where Self: 'a;

    fn open(config: &Config) -> Result<Self> {
        DiskVec::open(config)
    }

    fn try_clone(&self) -> Result<Self> {
        let mut copy = DiskVec::open(&self.config)?;
        copy.try_assign(DiskIter::new(self))?;
        Ok(copy)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn capacity(&self) -> usize {
        self.block_count().max(self.reserved_blocks) * self.block_len
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        let needed = self.len.saturating_add(additional).div_ceil(self.block_len);
        if needed > self.reserved_blocks {
            self.reserved_blocks = needed;
            let inner = self.inner.get_mut();
            let extra = needed.saturating_sub(inner.table.len());
            inner.table.reserve(extra);
        }
        Ok(())
    }

    fn resize(&mut self, new_len: usize) -> Result<()> {
        if new_len <= self.len {
            return self.truncate(new_len);
        }
        while self.len < new_len {
            Backend::push(self, T::default())?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let inner = self.inner.get_mut();
        inner.cache.clear();
        inner.table.clear();
        self.len = 0;
        inner.spill.reset()
    }

    fn push(&mut self, value: T) -> Result<()> {
        let index = self.len / self.block_len;
        let inner = self.inner.get_mut();

        if index == inner.table.len() {
            inner.new_block(vec![value])?;
        } else {
            inner.block_mut(index)?.push(value);
        }
        self.len += 1;
        Ok(())
    }

    fn pop(&mut self) -> Result<Option<T>> {
        if self.len == 0 {
            return Ok(None);
        }

        let last = self.len - 1;
        let index = last / self.block_len;
        let inner = self.inner.get_mut();

        let value = inner.block_mut(index)?.pop().ok_or_else(|| {
            TierError::Storage(format!("Block {} is shorter than expected", index))
        })?;

        if last % self.block_len == 0 {
            inner.drop_block(index);
            inner.table.truncate(index);
        }
        self.len = last;
        Ok(Some(value))
    }

    fn get(&self, index: usize) -> Result<T> {
        self.check_index(index)?;
        let block_index = index / self.block_len;
        let offset = index % self.block_len;

        let mut inner = self.inner.lock();
        inner.ensure_resident(block_index)?;
        let value = inner
            .cache
            .peek(block_index)
            .and_then(|block| block.items.as_slice().get(offset))
            .cloned();

        value.ok_or_else(|| {
            TierError::Storage(format!("Element {} missing from block {}", index, block_index))
        })
    }

    fn set(&mut self, index: usize, value: T) -> Result<()> {
        self.check_index(index)?;
        let block_index = index / self.block_len;
        let offset = index % self.block_len;

        let items = self.inner.get_mut().block_mut(block_index)?;
        match items.get_mut(offset) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(TierError::Storage(format!(
                "Element {} missing from block {}",
                index, block_index
            ))),
        }
    }

    /// Streams full blocks directly to the spill file; only the partial tail
    /// block ends up resident.
    fn try_assign<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<T>>,
    {
        Backend::clear(self)?;

        let mut chunk = Vec::with_capacity(self.block_len);
        let mut result = Ok(());
        for item in items {
            match item {
                Ok(value) => chunk.push(value),
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
            if chunk.len() == self.block_len {
                if let Err(e) = self.spill_full_block(&mut chunk) {
                    result = Err(e);
                    break;
                }
            }
        }

        if !chunk.is_empty() {
            self.adopt_tail(chunk)?;
        }
        result
    }

    fn try_extend<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<T>>,
    {
        for item in items {
            Backend::push(self, item?)?;
        }
        Ok(())
    }

    fn iter(&self) -> Self::Iter<'_> {
        DiskIter::new(self)
    }
}

impl<T> std::fmt::Debug for DiskVec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskVec")
            .field("len", &self.len)
            .field("block_len", &self.block_len)
            .field("spill", &self.inner.lock().spill)
            .finish()
    }
}
