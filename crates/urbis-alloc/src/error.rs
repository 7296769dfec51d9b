//! Allocator and upload-queue error types.

use crate::block::Block;

/// Errors that can occur during arena operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    /// No free block is large enough for the request. Device memory pools
    /// are fixed-size, so callers treat this as unrecoverable after one
    /// coalesce-and-retry.
    #[error("arena out of memory: requested {requested} bytes, largest free block {largest_free} bytes")]
    OutOfMemory {
        /// Number of bytes requested.
        requested: u64,
        /// Size of the largest free block at the time of the request.
        largest_free: u64,
    },

    /// Released a block whose start offset is not in the used set:
    /// a double free or a block belonging to another arena.
    #[error("release of unknown block at offset {start}")]
    UnknownBlock {
        /// Start offset of the rejected block.
        start: u64,
    },

    /// Zero-byte allocations are rejected; an empty block would break the
    /// free/used partition of the arena's byte range.
    #[error("zero-size allocation")]
    ZeroSize,
}

/// Errors that can occur when enqueueing or flushing uploads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    /// The source byte length does not match the destination block size.
    #[error("upload length mismatch: destination block is {expected} bytes, source is {actual} bytes")]
    LengthMismatch {
        /// Destination block size.
        expected: u64,
        /// Source slice length.
        actual: u64,
    },

    /// A destination block falls outside the mapped region. The whole
    /// flush fails; writes already applied stay applied.
    #[error("upload destination [{}, {}) exceeds mapped region of {mapped_len} bytes", destination.start, destination.end())]
    OutOfBounds {
        /// The destination block that did not fit.
        destination: Block,
        /// Length of the mapped region the flush ran against.
        mapped_len: usize,
    },
}
