//! Free-list construction.

use std::io::{Seek, Write};

use crate::error::Result;
use crate::image::ImageWriter;
use crate::layout::{block_offset, FREE_LIST_END};

/// Link blocks `[lo, hi)` into a free list and return its head.
///
/// Blocks are prepended from the top down, so the list walks in increasing
/// block order. Returns `FREE_LIST_END` when the range is empty.
pub fn build_free_list<W: Write + Seek>(writer: &mut ImageWriter<W>, lo: u32, hi: u32) -> Result<u32> {
    let mut head = FREE_LIST_END;
    for block in (lo..hi).rev() {
        writer.seek(block_offset(block))?;
        writer.write_int(head, 4)?;
        head = block;
    }
    Ok(head)
}
