//! Forward-only block allocation.

use crate::error::{MkfsError, Result};

/// Bump allocator over `[cursor, total)`. Blocks are never returned.
#[derive(Debug)]
pub struct BlockAllocator {
    cursor: u32,
    total: u32,
}

impl BlockAllocator {
    pub fn new(first_free: u32, total: u32) -> Self {
        BlockAllocator {
            cursor: first_free.min(total),
            total,
        }
    }

    /// Hand out `n` contiguous blocks starting at the cursor.
    pub fn allocate(&mut self, n: usize) -> Result<Vec<u32>> {
        let exceeded = || MkfsError::CapacityExceeded {
            requested: n as u64,
            cursor: self.cursor,
            total: self.total,
        };
        let count = u32::try_from(n).map_err(|_| exceeded())?;
        let end = match self.cursor.checked_add(count) {
            Some(end) if end <= self.total => end,
            _ => return Err(exceeded()),
        };

        let blocks: Vec<u32> = (self.cursor..end).collect();
        self.cursor = end;
        Ok(blocks)
    }

    /// First block that has not been handed out yet.
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn total(&self) -> u32 {
        self.total
    }
}
