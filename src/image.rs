//! Positioned writes into the image being built.

use std::io::{Seek, SeekFrom, Write};

use crate::error::{MkfsError, Result};
use crate::layout::{block_offset, BLOCK_SIZE};

/// Little-endian writer over the image backing store.
///
/// Production builds write to a `File`; tests use `Cursor<Vec<u8>>`.
pub struct ImageWriter<W: Write + Seek> {
    base: W,
}

impl<W: Write + Seek> ImageWriter<W> {
    /// Pre-size the image to `total_blocks` blocks by writing its last byte.
    /// Everything before it reads back as zero (a hole on sparse filesystems).
    pub fn create(mut base: W, total_blocks: u32) -> Result<Self> {
        if total_blocks == 0 {
            return Err(MkfsError::InvalidInput(
                "image needs at least one block for the superblock".to_string(),
            ));
        }
        base.seek(SeekFrom::Start(block_offset(total_blocks) - 1))?;
        base.write_all(&[0])?;
        Ok(ImageWriter { base })
    }

    pub fn seek(&mut self, position: u64) -> Result<()> {
        self.base.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    /// Write the low `width` bytes of `value`, little-endian.
    pub fn write_int(&mut self, value: u32, width: usize) -> Result<()> {
        if !(1..=4).contains(&width) {
            return Err(MkfsError::InvalidInput(format!(
                "integer width {width} is not between 1 and 4 bytes"
            )));
        }
        debug_assert!(width == 4 || value >> (width * 8) == 0);
        self.base.write_all(&value.to_le_bytes()[..width])?;
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.base.write_all(bytes)?;
        Ok(())
    }

    /// Write `bytes` across `blocks`, one block-sized chunk per block.
    pub fn write_span(&mut self, blocks: &[u32], bytes: &[u8]) -> Result<()> {
        if bytes.len() > blocks.len() * BLOCK_SIZE {
            return Err(MkfsError::InvalidInput(format!(
                "{} bytes do not fit in {} blocks",
                bytes.len(),
                blocks.len()
            )));
        }
        for (chunk, &block) in bytes.chunks(BLOCK_SIZE).zip(blocks) {
            self.seek(block_offset(block))?;
            self.base.write_all(chunk)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.base.flush()?;
        Ok(())
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.base
    }
}
