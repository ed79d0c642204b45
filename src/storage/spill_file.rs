//! Spill File
//!
//! Append-only file of block frames. The file is unlinked on creation, so
//! its contents never outlive the owning store.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, TierError};

use super::block::{frame_header, parse_frame_header, BlockHandle};
use super::{COMPACTION_MIN_GARBAGE, FRAME_HEADER_SIZE, HEADER_SIZE, MAGIC, VERSION};

/// Spill file holding the on-disk blocks of one store
pub struct SpillFile {
    /// Directory the file was created in (compaction creates its successor there)
    dir: PathBuf,
    /// Unlinked file handle
    file: File,
    /// Elements per block, recorded in the header
    block_len: u32,
    /// Current end of file (next frame offset)
    end: u64,
    /// Bytes of frames still referenced by a block handle
    live_bytes: u64,
}

impl SpillFile {
    /// Create a new spill file in `dir`
    ///
    /// Writes the header immediately.
    pub fn create(dir: &Path, block_len: u32) -> Result<Self> {
        let mut file = tempfile::tempfile_in(dir)?;

        file.write_all(MAGIC)?;
        file.write_all(&VERSION.to_le_bytes())?;
        file.write_all(&block_len.to_le_bytes())?;

        Ok(Self {
            dir: dir.to_path_buf(),
            file,
            block_len,
            end: HEADER_SIZE,
            live_bytes: 0,
        })
    }

    /// Re-read and validate the header, returning the recorded block length
    pub fn read_header(&mut self) -> Result<u32> {
        let mut header = [0u8; HEADER_SIZE as usize];
        self.file.seek(SeekFrom::Start(0))?;
        self.file.read_exact(&mut header)?;

        if &header[0..4] != MAGIC {
            return Err(TierError::SpillCorruption(format!(
                "Invalid spill file magic: expected TVSP, got {:?}",
                &header[0..4]
            )));
        }

        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != VERSION {
            return Err(TierError::SpillCorruption(format!(
                "Unsupported spill file version: {}",
                version
            )));
        }

        Ok(u32::from_le_bytes([header[6], header[7], header[8], header[9]]))
    }

    /// Append a frame for `payload` and return its handle
    pub fn append(&mut self, payload: &[u8]) -> Result<BlockHandle> {
        let (header, crc) = frame_header(payload);
        let offset = self.end;

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&header)?;
        self.file.write_all(payload)?;

        let handle = BlockHandle {
            offset,
            len: payload.len() as u32,
            crc,
        };
        self.end += handle.frame_size();
        self.live_bytes += handle.frame_size();

        Ok(handle)
    }

    /// Read and verify the payload a handle points at
    pub fn read(&mut self, handle: &BlockHandle) -> Result<Vec<u8>> {
        if handle.offset < HEADER_SIZE || handle.offset + handle.frame_size() > self.end {
            return Err(TierError::SpillCorruption(format!(
                "Frame at offset {} lies outside the spill file ({} bytes)",
                handle.offset, self.end
            )));
        }

        self.file.seek(SeekFrom::Start(handle.offset))?;

        let mut header = [0u8; FRAME_HEADER_SIZE as usize];
        self.file.read_exact(&mut header)?;
        let (len, crc) = parse_frame_header(&header);

        if len != handle.len || crc != handle.crc {
            return Err(TierError::SpillCorruption(format!(
                "Frame header at offset {} does not match its block handle",
                handle.offset
            )));
        }

        let mut payload = vec![0u8; len as usize];
        self.file.read_exact(&mut payload)?;

        if crc32fast::hash(&payload) != crc {
            return Err(TierError::SpillCorruption(format!(
                "CRC mismatch in frame at offset {}",
                handle.offset
            )));
        }

        Ok(payload)
    }

    /// Mark a frame as no longer referenced
    pub fn release(&mut self, handle: &BlockHandle) {
        self.live_bytes = self.live_bytes.saturating_sub(handle.frame_size());
    }

    /// Drop every frame, keeping only the header
    pub fn reset(&mut self) -> Result<()> {
        self.file.set_len(HEADER_SIZE)?;
        self.end = HEADER_SIZE;
        self.live_bytes = 0;
        Ok(())
    }

    /// Total file size in bytes
    pub fn file_size(&self) -> u64 {
        self.end
    }

    /// Bytes of frames still referenced
    pub fn live_bytes(&self) -> u64 {
        self.live_bytes
    }

    /// Bytes of superseded frames
    pub fn garbage_bytes(&self) -> u64 {
        self.end - HEADER_SIZE - self.live_bytes
    }

    /// Garbage outweighs live data and is large enough to be worth a rewrite
    pub fn should_compact(&self) -> bool {
        let garbage = self.garbage_bytes();
        garbage >= COMPACTION_MIN_GARBAGE && garbage > self.live_bytes
    }

    /// Copy every live frame into a fresh spill file and rewrite `handles`.
    ///
    /// The handles are only updated once every frame has been copied, so a
    /// failed compaction leaves this file and its handles untouched.
    pub fn compact(&mut self, handles: &mut [Option<BlockHandle>]) -> Result<()> {
        let mut next = SpillFile::create(&self.dir, self.block_len)?;
        let mut moved = Vec::with_capacity(handles.len());

        for handle in handles.iter() {
            let relocated = match handle {
                Some(h) => {
                    let payload = self.read(h)?;
                    Some(next.append(&payload)?)
                }
                None => None,
            };
            moved.push(relocated);
        }

        tracing::debug!(
            "Compacted spill file: {} -> {} bytes",
            self.end,
            next.end
        );

        handles.copy_from_slice(&moved);
        *self = next;
        Ok(())
    }
}

impl std::fmt::Debug for SpillFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpillFile")
            .field("dir", &self.dir)
            .field("block_len", &self.block_len)
            .field("file_size", &self.end)
            .field("live_bytes", &self.live_bytes)
            .finish()
    }
}
