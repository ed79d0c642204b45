//! Error types for TierVec
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using TierError
pub type Result<T> = std::result::Result<T, TierError>;

/// Unified error type for TierVec operations
#[derive(Debug, Error)]
pub enum TierError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Spill Store Errors
    // -------------------------------------------------------------------------
    #[error("Spill file corruption detected: {0}")]
    SpillCorruption(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    // -------------------------------------------------------------------------
    // Sequence Errors
    // -------------------------------------------------------------------------
    #[error("Bad state: {0}")]
    BadState(String),

    #[error("Index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Cursor belongs to a different sequence")]
    ForeignCursor,
}

impl From<bincode::Error> for TierError {
    fn from(e: bincode::Error) -> Self {
        TierError::Serialization(e.to_string())
    }
}
