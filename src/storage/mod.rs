//! Storage Module
//!
//! Disk-resident secondary store backed by an unlinked spill file.
//!
//! ## Responsibilities
//! - Hold elements in fixed-count blocks, most of them on disk
//! - Keep a bounded LRU set of decoded blocks in memory
//! - Write dirty blocks back on eviction, append-only
//! - Reclaim space from superseded frames by compaction
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (10 bytes)                                       │
//! │   Magic: "TVSP" (4) | Version: u16 (2) | BlockLen: u32  │
//! ├─────────────────────────────────────────────────────────┤
//! │ Frames (variable, append-only)                          │
//! │   [PayloadLen: u32][CRC32: u32][Payload: bincode Vec<T>]│
//! │   ... one frame per block write ...                     │
//! │   (a rewritten block leaves its old frame as garbage)   │
//! └─────────────────────────────────────────────────────────┘
//! ```

mod block;
mod cache;
mod disk_vec;
mod iterator;
mod spill_file;

pub use block::BlockHandle;
pub use disk_vec::DiskVec;
pub use iterator::DiskIter;
pub use spill_file::SpillFile;

// =============================================================================
// Shared Constants (used by spill file, frame codec, disk vector)
// =============================================================================

/// Magic bytes identifying a TierVec spill file
pub(crate) const MAGIC: &[u8; 4] = b"TVSP";

/// Current spill file format version
pub(crate) const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + BlockLen (4) = 10 bytes
pub(crate) const HEADER_SIZE: u64 = 10;

/// Frame header size: PayloadLen (4) + CRC32 (4) = 8 bytes
pub(crate) const FRAME_HEADER_SIZE: u64 = 8;

/// Garbage below this many bytes never triggers automatic compaction
pub(crate) const COMPACTION_MIN_GARBAGE: u64 = 1 << 20;
