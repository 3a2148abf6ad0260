/// simfs image builder.
///
/// Walks a host directory in preorder and lays it out as:
///   Block 0: superblock, whose first 128 bytes are the root dirent
///   Blocks 1..cursor: child dirent arrays, file contents and indirect
///     blocks, in the order the walk reaches them
///   Blocks cursor..total: free list
///
/// A directory's child array is allocated before any of its children, so
/// child `i` always lives at byte `i * 128` of one contiguous span.
use log::{debug, info};
use regex::Regex;
use std::fs::{self, Metadata};
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};

use crate::alloc::BlockAllocator;
use crate::dirent::{self, Dirent};
use crate::error::{MkfsError, Result};
use crate::freelist;
use crate::image::ImageWriter;
use crate::layout::{block_offset, blocks_for, DIRENT_SIZE, SUPERBLOCK_ID};
use crate::superblock;

/// Deepest directory nesting accepted below the root.
pub const MAX_DEPTH: usize = 256;

const ROOT_DIRENT_OFFSET: u64 = 0;

/// Settings for one image build.
#[derive(Debug)]
pub struct BuildOptions {
    pub total_blocks: u32,
    /// Entries whose bare name contains a match are left out of the image.
    pub skip: Option<Regex>,
    /// Sort directory entries by name instead of keeping host order.
    pub sort_entries: bool,
}

impl BuildOptions {
    /// An empty `skip_pattern` disables exclusion.
    pub fn new(total_blocks: u32, skip_pattern: &str, sort_entries: bool) -> Result<Self> {
        let skip = if skip_pattern.is_empty() {
            None
        } else {
            let re = Regex::new(skip_pattern).map_err(|e| {
                MkfsError::InvalidInput(format!("bad entry-to-skip pattern: {e}"))
            })?;
            Some(re)
        };
        Ok(BuildOptions {
            total_blocks,
            skip,
            sort_entries,
        })
    }

    fn is_skipped(&self, name: &str) -> bool {
        self.skip.as_ref().is_some_and(|re| re.is_match(name))
    }
}

/// Block usage of a finished image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSummary {
    pub total_blocks: u32,
    pub used_blocks: u32,
    pub free_list_head: u32,
}

impl ImageSummary {
    pub fn free_blocks(&self) -> u32 {
        self.total_blocks - self.used_blocks
    }
}

/// Fail unless `root` can serve as the image's root directory.
pub fn check_root(root: &Path) -> Result<()> {
    if !stat(root)?.is_dir() {
        return Err(MkfsError::InvalidInput(format!(
            "root {root:?} is not a directory"
        )));
    }
    Ok(())
}

/// Build a complete image of `root` into `base`.
///
/// `base` must be empty or disposable: it is pre-sized to the full image and
/// left partially written if any step fails.
pub fn build_image<W: Write + Seek>(
    base: W,
    root: &Path,
    options: &BuildOptions,
) -> Result<ImageSummary> {
    check_root(root)?;

    let mut ctx = MkfsContext::new(base, options)?;
    ctx.build(ROOT_DIRENT_OFFSET, "", root, 0)?;

    let MkfsContext { mut writer, alloc, .. } = ctx;
    let used_blocks = alloc.cursor();
    let total_blocks = alloc.total();

    let free_list_head = freelist::build_free_list(&mut writer, used_blocks, total_blocks)?;
    superblock::finalize(&mut writer, free_list_head, total_blocks)?;
    writer.flush()?;

    let summary = ImageSummary {
        total_blocks,
        used_blocks,
        free_list_head,
    };
    info!(
        "Image built: {} of {} blocks used, {} free (free list head {})",
        summary.used_blocks,
        summary.total_blocks,
        summary.free_blocks(),
        summary.free_list_head,
    );
    Ok(summary)
}

/// State carried through one traversal.
struct MkfsContext<'a, W: Write + Seek> {
    writer: ImageWriter<W>,
    alloc: BlockAllocator,
    options: &'a BuildOptions,
}

impl<'a, W: Write + Seek> MkfsContext<'a, W> {
    fn new(base: W, options: &'a BuildOptions) -> Result<Self> {
        let writer = ImageWriter::create(base, options.total_blocks)?;
        Ok(MkfsContext {
            writer,
            alloc: BlockAllocator::new(SUPERBLOCK_ID + 1, options.total_blocks),
            options,
        })
    }

    /// Write the dirent for `path` at `offset`, then everything below it.
    fn build(&mut self, offset: u64, name: &str, path: &Path, depth: usize) -> Result<()> {
        let metadata = stat(path)?;
        if metadata.is_file() {
            self.build_file(offset, name, path, &metadata)
        } else if metadata.is_dir() {
            self.build_dir(offset, name, path, depth)
        } else {
            Err(MkfsError::InvalidInput(format!(
                "{path:?} is neither a regular file nor a directory"
            )))
        }
    }

    fn build_file(
        &mut self,
        offset: u64,
        name: &str,
        path: &Path,
        metadata: &Metadata,
    ) -> Result<()> {
        let oversized = |blocks: usize| MkfsError::UnsupportedLayout {
            name: name.to_string(),
            blocks,
        };
        // Reject from the stat alone; oversized files are never read.
        let len = usize::try_from(metadata.len()).map_err(|_| oversized(usize::MAX))?;
        let nblocks = blocks_for(len);
        dirent::check_addressable(name, nblocks)?;
        let size = u32::try_from(len).map_err(|_| oversized(nblocks))?;

        let data = fs::read(path).map_err(|source| host_read(path, source))?;
        if data.len() != len {
            let changed = format!("size changed from {len} to {} bytes during build", data.len());
            return Err(host_read(path, io::Error::other(changed)));
        }

        let blocks = self.alloc.allocate(nblocks)?;
        dirent::encode(
            &mut self.writer,
            &mut self.alloc,
            offset,
            &Dirent {
                name,
                size,
                blocks: &blocks,
                is_dir: false,
            },
        )?;
        self.writer.write_span(&blocks, &data)?;

        debug!(
            "file {:?}: {} bytes, blocks {:?}",
            path,
            size,
            blocks.first().map(|&b| b..b + blocks.len() as u32)
        );
        Ok(())
    }

    fn build_dir(&mut self, offset: u64, name: &str, path: &Path, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(MkfsError::InvalidInput(format!(
                "{path:?} is nested deeper than {MAX_DEPTH} directories"
            )));
        }

        let children = self.list_children(path)?;
        let array_bytes = children.len() * DIRENT_SIZE;
        let nblocks = blocks_for(array_bytes);
        dirent::check_addressable(name, nblocks)?;
        let size = u32::try_from(array_bytes).map_err(|_| MkfsError::UnsupportedLayout {
            name: name.to_string(),
            blocks: nblocks,
        })?;

        let blocks = self.alloc.allocate(nblocks)?;
        dirent::encode(
            &mut self.writer,
            &mut self.alloc,
            offset,
            &Dirent {
                name,
                size,
                blocks: &blocks,
                is_dir: true,
            },
        )?;

        debug!(
            "dir {:?}: {} entries, blocks {:?}",
            path,
            children.len(),
            blocks.first().map(|&b| b..b + blocks.len() as u32)
        );

        let Some(&first) = blocks.first() else {
            return Ok(());
        };
        let array_start = block_offset(first);
        for (i, (child_name, child_path)) in children.iter().enumerate() {
            let child_offset = array_start + (i * DIRENT_SIZE) as u64;
            self.build(child_offset, child_name, child_path, depth + 1)?;
        }
        Ok(())
    }

    /// Entries of `dir` that survive the skip pattern, in host order unless
    /// sorting was requested.
    fn list_children(&self, dir: &Path) -> Result<Vec<(String, PathBuf)>> {
        let read_dir = fs::read_dir(dir).map_err(|source| host_read(dir, source))?;

        let mut children = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| host_read(dir, source))?;
            let raw_name = entry.file_name();
            if self.options.is_skipped(&raw_name.to_string_lossy()) {
                debug!("skipping {:?}", entry.path());
                continue;
            }
            let name = raw_name
                .into_string()
                .map_err(|raw| MkfsError::InvalidName(raw.to_string_lossy().into_owned()))?;
            children.push((name, entry.path()));
        }

        if self.options.sort_entries {
            children.sort_by(|a, b| a.0.cmp(&b.0));
        }
        Ok(children)
    }
}

/// Follows symlinks, so a link is stored as whatever it points to.
fn stat(path: &Path) -> Result<Metadata> {
    fs::metadata(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            MkfsError::InvalidInput(format!(
                "{path:?} is neither a regular file nor a directory"
            ))
        } else {
            host_read(path, source)
        }
    })
}

fn host_read(path: &Path, source: io::Error) -> MkfsError {
    MkfsError::HostRead {
        path: path.to_path_buf(),
        source,
    }
}
