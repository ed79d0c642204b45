//! # TierVec
//!
//! A growable, indexable sequence that keeps its elements in memory while
//! small and moves them to a disk-resident store once they grow large:
//! - Automatic promotion/demotion at a configurable byte threshold
//! - Pinning to either store
//! - Block-structured spill files with CRC-checked frames
//! - Cursors and detached positions that survive migration
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         TierVec                              │
//! │         (logical size, threshold, pin, cursors)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Tier (exactly one live)
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Primary   │          │  Secondary  │
//!   │ (MemoryVec) │          │  (DiskVec)  │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                          ┌────────┴────────┐
//!                          ▼                 ▼
//!                   ┌─────────────┐   ┌─────────────┐
//!                   │ Block Cache │   │ Spill File  │
//!                   │    (LRU)    │   │  (frames)   │
//!                   └─────────────┘   └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use tiervec::{Config, Residency, TierVec};
//!
//! let config = Config::builder().threshold(16).build();
//! let mut vec: TierVec<u32> = TierVec::with_config(config)?;
//! for i in 0..4 {
//!     vec.push(i)?;
//! }
//! assert_eq!(vec.residency(), Residency::Secondary);
//! assert_eq!(vec.get(2)?, 2);
//! # Ok::<(), tiervec::TierError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod backend;
pub mod storage;
pub mod sequence;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, TierError};
pub use config::{Config, ConfigBuilder};
pub use backend::{Backend, MemoryVec};
pub use storage::DiskVec;
pub use sequence::{Cursor, CursorMut, Iter, Position, Residency, TierVec};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of TierVec
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
