//! TierVec
//!
//! The sequence core: owns one backend, tracks the logical size, and moves
//! the elements between stores when the byte size crosses the threshold.
//!
//! ## Policy
//! - `push`: promote *before* forwarding when the new byte size `>= threshold`
//! - `pop`: demote *after* forwarding when the new byte size `< threshold`
//! - `assign` / `append`: re-evaluate the tier for the final length
//! - `clear`: request demotion
//! - `resize`, `reserve`: forwarded only, the tier is never re-evaluated
//! - a pin disables every automatic move

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::backend::{Backend, MemoryVec};
use crate::config::Config;
use crate::error::{Result, TierError};
use crate::storage::DiskVec;

use super::cursor::{Cursor, CursorMut, Iter, Position};
use super::tier::{on_tier, Residency, Tier};

static NEXT_SEQUENCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one sequence object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SequenceId(u64);

impl SequenceId {
    fn next() -> Self {
        SequenceId(NEXT_SEQUENCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A growable, indexable sequence stored in exactly one of two backends
///
/// `P` is the primary (in-memory) store, `S` the secondary (disk) store.
/// Element access is by value; see [`Backend`].
pub struct TierVec<T, P = MemoryVec<T>, S = DiskVec<T>> {
    /// Identity carried by cursors and positions
    id: SequenceId,

    /// Threshold and backend options
    config: Config,

    /// Element count, independent of the backend
    len: usize,

    /// Store the sequence is locked to, if any
    pinned: Option<Residency>,

    /// The one live backend
    tier: Tier<P, S>,

    _element: PhantomData<fn() -> T>,
}

impl<T, P, S> TierVec<T, P, S>
where
    T: Clone,
    P: Backend<T>,
    S: Backend<T>,
{
    /// Create an empty sequence
    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_len(0, config)
    }

    /// Create a sequence of `len` default-valued elements
    ///
    /// Fails with `InvalidConfiguration` when both pins are requested.
    pub fn with_len(len: usize, config: Config) -> Result<Self> {
        let mut vec = Self::empty_for(len, config)?;
        on_tier!(&mut vec.tier, backend => backend.resize(len))?;
        vec.len = vec.backend_len();
        Ok(vec)
    }

    /// Create a sequence holding `items`, in order
    pub fn from_iter_with<I>(items: I, config: Config) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let items = items.into_iter();
        let mut vec = Self::empty_for(items.len(), config)?;
        on_tier!(&mut vec.tier, backend => backend.try_assign(items.map(Ok)))?;
        vec.len = vec.backend_len();
        Ok(vec)
    }

    /// Empty sequence in the store a construction of `len` elements starts in.
    ///
    /// That is the secondary store when pinned there or when `len` elements
    /// already meet the threshold. A primary pin does not pull a large
    /// initial size into memory; it only blocks later automatic moves.
    fn empty_for(len: usize, config: Config) -> Result<Self> {
        let pinned = config.validate()?;
        let residency = if pinned == Some(Residency::Secondary)
            || Self::bytes_for(len) >= config.threshold
        {
            Residency::Secondary
        } else {
            Residency::Primary
        };

        let tier = match residency {
            Residency::Primary => Tier::Primary(P::open(&config)?),
            Residency::Secondary => Tier::Secondary(S::open(&config)?),
        };

        tracing::debug!(
            "Created sequence for {} elements in {} store (threshold={} bytes, pinned={:?})",
            len,
            residency,
            config.threshold,
            pinned
        );

        Ok(Self {
            id: SequenceId::next(),
            config,
            len: 0,
            pinned,
            tier,
            _element: PhantomData,
        })
    }

    // =========================================================================
    // Size and Capacity
    // =========================================================================

    /// Number of elements; never touches the backend
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Byte size compared against the threshold
    pub fn real_size(&self) -> u64 {
        Self::bytes_for(self.len)
    }

    pub fn capacity(&self) -> usize {
        on_tier!(&self.tier, backend => backend.capacity())
    }

    /// Forwarded to the live backend; never moves the sequence
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.check_consistency()?;
        on_tier!(&mut self.tier, backend => backend.reserve(additional))
    }

    /// Truncate or extend with default values.
    ///
    /// The tier is *not* re-evaluated, so a resize can leave the sequence on
    /// the "wrong" side of the threshold until the next push, pop, assign,
    /// append or clear.
    pub fn resize(&mut self, new_len: usize) -> Result<()> {
        self.check_consistency()?;
        let result = on_tier!(&mut self.tier, backend => backend.resize(new_len));
        self.settle(result)?;
        self.len = new_len;
        Ok(())
    }

    /// Remove every element and request demotion to the primary store.
    ///
    /// Under a secondary pin the request is ignored and the sequence stays
    /// secondary-resident, now empty.
    pub fn clear(&mut self) -> Result<()> {
        self.check_consistency()?;
        let result = on_tier!(&mut self.tier, backend => backend.clear());
        self.settle(result)?;
        self.len = 0;
        self.migrate(Residency::Primary)
    }

    // =========================================================================
    // Element Access
    // =========================================================================

    /// Copy of the element at `index`
    pub fn get(&self, index: usize) -> Result<T> {
        self.check_consistency()?;
        on_tier!(&self.tier, backend => backend.get(index))
    }

    /// Overwrite the element at `index`
    pub fn set(&mut self, index: usize, value: T) -> Result<()> {
        self.check_consistency()?;
        on_tier!(&mut self.tier, backend => backend.set(index, value))
    }

    /// Read-modify-write of the element at `index`
    pub fn update<F>(&mut self, index: usize, f: F) -> Result<()>
    where
        F: FnOnce(&mut T),
    {
        let mut value = self.get(index)?;
        f(&mut value);
        self.set(index, value)
    }

    pub fn front(&self) -> Result<T> {
        self.get(0)
    }

    pub fn back(&self) -> Result<T> {
        match self.len.checked_sub(1) {
            Some(last) => self.get(last),
            None => Err(TierError::IndexOutOfBounds { index: 0, len: 0 }),
        }
    }

    /// Copy every element into a `Vec`
    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.iter().collect()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Append one element, promoting first if the new size meets the threshold
    pub fn push(&mut self, value: T) -> Result<()> {
        self.check_consistency()?;
        let new_len = self.len + 1;
        if self.preferred(new_len) == Residency::Secondary {
            self.migrate(Residency::Secondary)?;
        }

        let result = on_tier!(&mut self.tier, backend => backend.push(value));
        self.settle(result)?;
        self.len = new_len;
        Ok(())
    }

    /// Remove the last element, demoting afterwards if the new size is below
    /// the threshold. Returns `None` (and changes nothing) when empty.
    ///
    /// If the demotion fails the element is restored and the error returned.
    pub fn pop(&mut self) -> Result<Option<T>> {
        self.check_consistency()?;
        let result = on_tier!(&mut self.tier, backend => backend.pop());
        let Some(value) = self.settle(result)? else {
            return Ok(None);
        };

        self.len -= 1;
        if self.preferred(self.len) == Residency::Primary {
            if let Err(e) = self.migrate(Residency::Primary) {
                // Put the element back so a failed pop changes nothing
                let restored = on_tier!(&mut self.tier, backend => backend.push(value));
                self.settle(restored)?;
                self.len += 1;
                return Err(e);
            }
        }
        Ok(Some(value))
    }

    /// Replace the contents with `items`.
    ///
    /// The tier is chosen for the replacement's length regardless of where
    /// the sequence currently lives. When that changes the tier, the new
    /// backend is built straight from `items`.
    pub fn assign<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        self.check_consistency()?;
        let items = items.into_iter();
        // The length hint picks the tier; the backend's count sets the size
        let new_len = items.len();
        let target = self.pinned.unwrap_or_else(|| self.preferred(new_len));

        if target == self.residency() {
            let result = on_tier!(&mut self.tier, backend => backend.try_assign(items.map(Ok)));
            self.settle(result)?;
        } else {
            let tier = self.build_tier(target, items.map(Ok))?;
            self.tier = tier;
            let moved = self.backend_len();
            tracing::info!(
                "Moved sequence to {} store on assign: {} elements, {} bytes",
                target,
                moved,
                Self::bytes_for(moved)
            );
        }

        self.len = self.backend_len();
        Ok(())
    }

    /// Bulk-append `items`, choosing the tier for the combined length first
    pub fn append<I>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        self.check_consistency()?;
        let items = items.into_iter();
        let new_len = self.len + items.len();
        self.migrate(self.preferred(new_len))?;

        let result = on_tier!(&mut self.tier, backend => backend.try_extend(items.map(Ok)));
        self.settle(result)?;
        self.len = self.backend_len();
        Ok(())
    }

    // =========================================================================
    // Pin Controls
    // =========================================================================

    /// Move to the primary store and stay there
    pub fn pin_to_primary(&mut self) -> Result<()> {
        self.pin_to(Residency::Primary)
    }

    /// Move to the secondary store and stay there
    pub fn pin_to_secondary(&mut self) -> Result<()> {
        self.pin_to(Residency::Secondary)
    }

    /// Re-enable automatic switching and settle into the store the current
    /// size calls for
    pub fn unpin(&mut self) -> Result<()> {
        self.pinned = None;
        tracing::debug!("Sequence unpinned at {} elements", self.len);
        self.migrate(self.preferred(self.len))
    }

    // =========================================================================
    // Copy / Swap
    // =========================================================================

    /// Deep copy of the live backend, keeping residency, threshold and pin.
    /// The copy is a distinct sequence for cursor purposes.
    pub fn try_clone(&self) -> Result<Self> {
        self.check_consistency()?;
        let tier = match &self.tier {
            Tier::Primary(backend) => Tier::Primary(backend.try_clone()?),
            Tier::Secondary(backend) => Tier::Secondary(backend.try_clone()?),
        };

        Ok(Self {
            id: SequenceId::next(),
            config: self.config.clone(),
            len: self.len,
            pinned: self.pinned,
            tier,
            _element: PhantomData,
        })
    }

    /// Become a copy of `source`. Copies first, then swaps, so `self` is
    /// left untouched if the copy fails.
    pub fn assign_from(&mut self, source: &Self) -> Result<()> {
        let mut copy = source.try_clone()?;
        self.swap(&mut copy);
        Ok(())
    }

    /// Exchange contents, configuration, pin and backend with `other`.
    /// Each sequence keeps its own identity.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.config, &mut other.config);
        mem::swap(&mut self.len, &mut other.len);
        mem::swap(&mut self.pinned, &mut other.pinned);
        mem::swap(&mut self.tier, &mut other.tier);
    }

    // =========================================================================
    // Cursors
    // =========================================================================

    /// Cursor at the first element
    pub fn begin(&self) -> Cursor<'_, T, P, S> {
        Cursor::new(self, 0)
    }

    /// Cursor one past the last element
    pub fn end(&self) -> Cursor<'_, T, P, S> {
        Cursor::new(self, self.len)
    }

    pub fn cursor_at(&self, offset: usize) -> Cursor<'_, T, P, S> {
        Cursor::new(self, offset)
    }

    pub fn cursor_mut_at(&mut self, offset: usize) -> CursorMut<'_, T, P, S> {
        CursorMut::new(self, offset)
    }

    /// Detached position that survives mutation of this sequence
    pub fn position_at(&self, offset: usize) -> Position {
        Position::new(self.id, offset)
    }

    /// Re-bind a detached position; fails for positions of other sequences
    pub fn attach(&self, position: Position) -> Result<Cursor<'_, T, P, S>> {
        self.check_owner(&position)?;
        Ok(Cursor::new(self, position.offset()))
    }

    pub fn attach_mut(&mut self, position: Position) -> Result<CursorMut<'_, T, P, S>> {
        self.check_owner(&position)?;
        Ok(CursorMut::new(self, position.offset()))
    }

    /// Iterator over copies of the elements, front to back
    pub fn iter(&self) -> Iter<'_, T, P, S> {
        Iter::new(self)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Store currently holding the elements
    pub fn residency(&self) -> Residency {
        self.tier.residency()
    }

    pub fn pinned(&self) -> Option<Residency> {
        self.pinned
    }

    pub fn threshold(&self) -> u64 {
        self.config.threshold
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The secondary backend, when it is the live one
    pub fn secondary(&self) -> Option<&S> {
        match &self.tier {
            Tier::Secondary(backend) => Some(backend),
            Tier::Primary(_) => None,
        }
    }

    /// Check that the logical size matches the backend's element count
    pub fn verify(&self) -> Result<()> {
        let backend_len = self.backend_len();
        if backend_len != self.len {
            return Err(TierError::BadState(format!(
                "logical size {} but {} backend holds {} elements",
                self.len,
                self.residency(),
                backend_len
            )));
        }
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn bytes_for(len: usize) -> u64 {
        (len as u64).saturating_mul(mem::size_of::<T>() as u64)
    }

    /// Store the threshold calls for at `len` elements
    fn preferred(&self, len: usize) -> Residency {
        if Self::bytes_for(len) >= self.config.threshold {
            Residency::Secondary
        } else {
            Residency::Primary
        }
    }

    /// Move every element into a fresh `target` backend.
    ///
    /// No-op when pinned or already there. The target is fully built before
    /// the source is dropped, so a failed copy keeps the source live.
    fn migrate(&mut self, target: Residency) -> Result<()> {
        if self.pinned.is_some() || self.residency() == target {
            return Ok(());
        }

        let built = on_tier!(&self.tier, source => self.build_tier(target, source.iter()));
        match built {
            Ok(tier) => {
                tracing::info!(
                    "Migrated sequence to {} store: {} elements, {} bytes (threshold {})",
                    target,
                    self.len,
                    self.real_size(),
                    self.config.threshold
                );
                self.tier = tier;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "Migration to {} store failed, keeping {} store: {}",
                    target,
                    self.residency(),
                    e
                );
                Err(e)
            }
        }
    }

    /// Open a `target` backend and fill it from `items`
    fn build_tier<I>(&self, target: Residency, items: I) -> Result<Tier<P, S>>
    where
        I: IntoIterator<Item = Result<T>>,
    {
        Ok(match target {
            Residency::Primary => {
                let mut backend = P::open(&self.config)?;
                backend.try_assign(items)?;
                Tier::Primary(backend)
            }
            Residency::Secondary => {
                let mut backend = S::open(&self.config)?;
                backend.try_assign(items)?;
                Tier::Secondary(backend)
            }
        })
    }

    fn pin_to(&mut self, target: Residency) -> Result<()> {
        let previous = self.pinned.take();
        if let Err(e) = self.migrate(target) {
            self.pinned = previous;
            return Err(e);
        }
        self.pinned = Some(target);
        tracing::debug!("Sequence pinned to {} store", target);
        Ok(())
    }

    fn backend_len(&self) -> usize {
        on_tier!(&self.tier, backend => backend.len())
    }

    /// After a failed forward, take the backend's count as the logical size
    fn settle<R>(&mut self, result: Result<R>) -> Result<R> {
        if result.is_err() {
            self.len = self.backend_len();
        }
        result
    }

    fn check_consistency(&self) -> Result<()> {
        if cfg!(debug_assertions) {
            self.verify()
        } else {
            Ok(())
        }
    }

    fn check_owner(&self, position: &Position) -> Result<()> {
        if position.owner() != self.id {
            return Err(TierError::ForeignCursor);
        }
        Ok(())
    }
}

impl<'a, T, P, S> IntoIterator for &'a TierVec<T, P, S>
where
    T: Clone,
    P: Backend<T>,
    S: Backend<T>,
{
    type Item = Result<T>;
    type IntoIter = Iter<'a, T, P, S>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, P, S> fmt::Debug for TierVec<T, P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TierVec")
            .field("len", &self.len)
            .field("residency", &self.tier.residency())
            .field("pinned", &self.pinned)
            .field("threshold", &self.config.threshold)
            .finish()
    }
}
