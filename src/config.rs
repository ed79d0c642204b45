//! Configuration for TierVec
//!
//! Centralized configuration with sensible defaults.

use std::path::{Path, PathBuf};

use crate::error::{Result, TierError};
use crate::sequence::Residency;

/// Default tier switch threshold: 128 MiB
pub const DEFAULT_THRESHOLD: u64 = 128 << 20;

/// Main configuration for a TierVec instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Tiering Policy
    // -------------------------------------------------------------------------
    /// Byte size at which the sequence moves to the secondary store.
    /// Exactly at the threshold the sequence is secondary-resident.
    pub threshold: u64,

    /// Lock the sequence to the in-memory store.
    /// A sequence constructed at or above the threshold still starts on disk.
    pub pin_primary: bool,

    /// Lock the sequence to the disk-resident store
    pub pin_secondary: bool,

    // -------------------------------------------------------------------------
    // Secondary Store Configuration
    // -------------------------------------------------------------------------
    /// Directory for spill files (None = system temp directory).
    /// Spill files are unlinked on creation and vanish with the process.
    pub spill_dir: Option<PathBuf>,

    /// Elements per on-disk block
    pub block_len: usize,

    /// Decoded blocks kept in memory by the secondary store
    pub resident_blocks: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            pin_primary: false,
            pin_secondary: false,
            spill_dir: None,
            block_len: 4096,
            resident_blocks: 8,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the configuration and return the effective pin.
    ///
    /// Fails with `InvalidConfiguration` if both pins are requested or if the
    /// secondary store's block geometry is degenerate.
    pub fn validate(&self) -> Result<Option<Residency>> {
        if self.block_len == 0 {
            return Err(TierError::InvalidConfiguration(
                "block_len must be at least 1".to_string(),
            ));
        }
        if self.resident_blocks == 0 {
            return Err(TierError::InvalidConfiguration(
                "resident_blocks must be at least 1".to_string(),
            ));
        }

        match (self.pin_primary, self.pin_secondary) {
            (true, true) => Err(TierError::InvalidConfiguration(
                "both pin_primary and pin_secondary are enabled".to_string(),
            )),
            (true, false) => Ok(Some(Residency::Primary)),
            (false, true) => Ok(Some(Residency::Secondary)),
            (false, false) => Ok(None),
        }
    }

    /// Spill directory, falling back to the system temp directory
    pub fn spill_dir_or_default(&self) -> PathBuf {
        self.spill_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the tier switch threshold (in bytes)
    pub fn threshold(mut self, bytes: u64) -> Self {
        self.config.threshold = bytes;
        self
    }

    /// Lock the sequence to the in-memory store
    pub fn pin_primary(mut self, pin: bool) -> Self {
        self.config.pin_primary = pin;
        self
    }

    /// Lock the sequence to the disk-resident store
    pub fn pin_secondary(mut self, pin: bool) -> Self {
        self.config.pin_secondary = pin;
        self
    }

    /// Set the directory for spill files
    pub fn spill_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.config.spill_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the number of elements per on-disk block
    pub fn block_len(mut self, len: usize) -> Self {
        self.config.block_len = len;
        self
    }

    /// Set the number of decoded blocks kept in memory
    pub fn resident_blocks(mut self, count: usize) -> Self {
        self.config.resident_blocks = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
