//! simfs on-disk layout.
//!
//! All integers are little-endian u32 unless noted.
//!
//!   Block 0 (superblock):
//!     [0, 128)    root dirent
//!     [128, 132)  free-list head block id
//!     [132, 136)  total block count
//!
//!   Dirent (128 bytes):
//!     [0, 64)     name, NUL padded
//!     [64, 68)    size (file bytes, or child count * 128 for directories)
//!     [68, 116)   block table: 10 direct, 1 single-indirect, 1 reserved
//!     [116]       1 for directories, 0 for files
//!
//!   Indirect block: 1024 block ids.
//!   Free block: id of the next free block in its first 4 bytes, 0 ends the list.

pub const BLOCK_SIZE: usize = 4096;
pub const DIRENT_SIZE: usize = 128;

/// Name field size; the longest storable name is one byte shorter.
pub const NAME_BUF_SIZE: usize = 64;

pub const N_DIRECT_BLOCKS: usize = 10;
/// Slot of the single-indirect block id in the block table.
pub const IND_BLOCK_SLOT: usize = N_DIRECT_BLOCKS;
/// Reserved for double indirection, always written as 0.
pub const IND2_BLOCK_SLOT: usize = IND_BLOCK_SLOT + 1;
pub const BLOCK_TABLE_SLOTS: usize = IND2_BLOCK_SLOT + 1;

pub const PTRS_PER_BLOCK: usize = BLOCK_SIZE / 4;
pub const MAX_ADDRESSABLE_BLOCKS: usize = N_DIRECT_BLOCKS + PTRS_PER_BLOCK;

// Field offsets inside a dirent
pub const DIRENT_SIZE_OFFSET: usize = NAME_BUF_SIZE;
pub const DIRENT_TABLE_OFFSET: usize = DIRENT_SIZE_OFFSET + 4;
pub const DIRENT_FLAG_OFFSET: usize = DIRENT_TABLE_OFFSET + BLOCK_TABLE_SLOTS * 4;

pub const ET_FILE: u32 = 0;
pub const ET_DIR: u32 = 1;

pub const SUPERBLOCK_ID: u32 = 0;
pub const FREE_LIST_HEAD_OFFSET: u64 = DIRENT_SIZE as u64;
pub const TOTAL_BLOCKS_OFFSET: u64 = FREE_LIST_HEAD_OFFSET + 4;

/// Sentinel terminating the free list. Block 0 is the superblock, so no
/// free block can carry this id.
pub const FREE_LIST_END: u32 = 0;

/// Byte offset of a block within the image.
pub fn block_offset(block: u32) -> u64 {
    block as u64 * BLOCK_SIZE as u64
}

/// Number of blocks needed to hold `bytes` bytes.
pub fn blocks_for(bytes: usize) -> usize {
    bytes.div_ceil(BLOCK_SIZE)
}
