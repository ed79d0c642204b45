//! Sequence Core
//!
//! The public tiered sequence, its tier dispatch, and its cursors.
//!
//! ## Residency
//! A sequence lives in exactly one store at a time. Its byte size is
//! `len * size_of::<T>()`; at or above the threshold it belongs in the
//! secondary store, below it in the primary store. Moves happen only on
//! `push`, `pop`, `assign`, `append`, `clear`, the pin controls and
//! `unpin`.

pub(crate) mod tier;
mod cursor;
mod vector;

pub use cursor::{Cursor, CursorMut, Iter, Position};
pub use tier::Residency;
pub use vector::TierVec;
