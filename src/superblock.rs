use std::io::{Seek, Write};

use crate::error::Result;
use crate::image::ImageWriter;
use crate::layout::{FREE_LIST_HEAD_OFFSET, TOTAL_BLOCKS_OFFSET};

/// Write the superblock trailer that follows the root dirent.
pub fn finalize<W: Write + Seek>(
    writer: &mut ImageWriter<W>,
    free_list_head: u32,
    total_blocks: u32,
) -> Result<()> {
    writer.seek(FREE_LIST_HEAD_OFFSET)?;
    writer.write_int(free_list_head, 4)?;
    writer.seek(TOTAL_BLOCKS_OFFSET)?;
    writer.write_int(total_blocks, 4)?;
    Ok(())
}
