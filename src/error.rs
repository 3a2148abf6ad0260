//! Failure kinds of an image build.
//!
//! Every variant is fatal: the build stops at the first error and leaves the
//! partially written image behind. A declined confirmation prompt is not an
//! error and is modelled by [`crate::prompt::Confirmation`] instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MkfsError {
    /// Allocation would move the cursor past the end of the image.
    #[error("image full: {requested} more blocks requested at block {cursor}, image has {total}")]
    CapacityExceeded { requested: u64, cursor: u32, total: u32 },

    /// An entry needs more blocks than direct + single-indirect addressing reaches.
    #[error("{name:?} needs {blocks} blocks, more than direct and single-indirect slots can address")]
    UnsupportedLayout { name: String, blocks: usize },

    /// Name is not UTF-8, contains NUL, or does not fit the 64-byte name field.
    #[error("invalid entry name {0:?}: must be UTF-8 without NUL and shorter than 64 bytes")]
    InvalidName(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Reading the host tree failed.
    #[error("failed to read {path:?}: {source}")]
    HostRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the image failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MkfsError>;
