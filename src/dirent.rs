//! Directory entry encoding.
//!
//! A dirent addresses up to ten blocks directly. Longer block lists spill
//! into one indirect block allocated at encode time; anything past that would
//! need double indirection, which the reader does not support.

use std::io::{Seek, Write};

use crate::alloc::BlockAllocator;
use crate::error::{MkfsError, Result};
use crate::image::ImageWriter;
use crate::layout::{
    BLOCK_TABLE_SLOTS, ET_DIR, ET_FILE, IND_BLOCK_SLOT, MAX_ADDRESSABLE_BLOCKS, NAME_BUF_SIZE,
    N_DIRECT_BLOCKS, PTRS_PER_BLOCK,
};

/// One entry as it will be written to the image.
#[derive(Debug, Clone, Copy)]
pub struct Dirent<'a> {
    pub name: &'a str,
    pub size: u32,
    pub blocks: &'a [u32],
    pub is_dir: bool,
}

/// Fail with `UnsupportedLayout` if `blocks` cannot be addressed.
pub fn check_addressable(name: &str, blocks: usize) -> Result<()> {
    if blocks > MAX_ADDRESSABLE_BLOCKS {
        return Err(MkfsError::UnsupportedLayout {
            name: name.to_string(),
            blocks,
        });
    }
    Ok(())
}

fn encode_name(name: &str) -> Result<[u8; NAME_BUF_SIZE]> {
    let bytes = name.as_bytes();
    if bytes.len() >= NAME_BUF_SIZE || bytes.contains(&0) {
        return Err(MkfsError::InvalidName(name.to_string()));
    }
    let mut buf = [0u8; NAME_BUF_SIZE];
    buf[..bytes.len()].copy_from_slice(bytes);
    Ok(buf)
}

/// Write `dirent` at byte `offset`, allocating an indirect block if needed.
pub fn encode<W: Write + Seek>(
    writer: &mut ImageWriter<W>,
    alloc: &mut BlockAllocator,
    offset: u64,
    dirent: &Dirent<'_>,
) -> Result<()> {
    let name = encode_name(dirent.name)?;
    check_addressable(dirent.name, dirent.blocks.len())?;

    let mut table = [0u32; BLOCK_TABLE_SLOTS];
    let direct = dirent.blocks.len().min(N_DIRECT_BLOCKS);
    table[..direct].copy_from_slice(&dirent.blocks[..direct]);

    if dirent.blocks.len() > N_DIRECT_BLOCKS {
        let indirect = alloc.allocate(1)?[0];
        table[IND_BLOCK_SLOT] = indirect;

        let mut ptrs = vec![0u8; PTRS_PER_BLOCK * 4];
        for (slot, &block) in ptrs
            .chunks_exact_mut(4)
            .zip(&dirent.blocks[N_DIRECT_BLOCKS..])
        {
            slot.copy_from_slice(&block.to_le_bytes());
        }
        writer.write_span(&[indirect], &ptrs)?;
    }

    writer.seek(offset)?;
    writer.write_bytes(&name)?;
    writer.write_int(dirent.size, 4)?;
    for block in table {
        writer.write_int(block, 4)?;
    }
    writer.write_int(if dirent.is_dir { ET_DIR } else { ET_FILE }, 1)?;
    Ok(())
}
