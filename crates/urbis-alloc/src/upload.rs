//! Batched byte uploads applied against a mapped arena region in one pass.
//!
//! Producers enqueue (destination block, source bytes) pairs over the course
//! of a frame; the frame loop maps the destination arena once and flushes
//! the whole batch. The queue borrows its sources, so the rule that source
//! buffers outlive the flush is enforced by the compiler rather than by
//! convention.

use crate::block::Block;
use crate::error::UploadError;

/// One pending (destination, source) pair.
#[derive(Clone, Copy, Debug)]
pub struct PendingWrite<'a> {
    /// Destination byte range inside the mapped arena.
    pub destination: Block,
    /// Source bytes, exactly `destination.size` long.
    pub source: &'a [u8],
}

/// A single-use batch of pending writes.
///
/// `flush` consumes the queue; a fresh one is built for the next frame.
#[derive(Default)]
pub struct UploadQueue<'a> {
    writes: Vec<PendingWrite<'a>>,
}

impl<'a> UploadQueue<'a> {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self { writes: Vec::new() }
    }

    /// Append a write targeting `destination`.
    ///
    /// The source length must equal the destination block size; anything
    /// else is a caller error and is rejected without being queued.
    pub fn enqueue(&mut self, destination: Block, source: &'a [u8]) -> Result<(), UploadError> {
        if source.len() as u64 != destination.size {
            return Err(UploadError::LengthMismatch {
                expected: destination.size,
                actual: source.len() as u64,
            });
        }
        self.writes.push(PendingWrite {
            destination,
            source,
        });
        Ok(())
    }

    /// Apply every pending write against the mapped arena base, in enqueue
    /// order, and return the total bytes written.
    ///
    /// Later writes to overlapping destinations win by ordering. A
    /// destination outside the mapped region fails the flush before the
    /// offending write lands; earlier writes stay applied, since a mapping
    /// that cannot hold a block the arena handed out is unrecoverable
    /// mid-frame anyway.
    pub fn flush(self, mapped: &mut [u8]) -> Result<usize, UploadError> {
        let mut written = 0;
        for write in self.writes {
            let start = write.destination.start as usize;
            let end = write.destination.end() as usize;
            let Some(target) = mapped.get_mut(start..end) else {
                return Err(UploadError::OutOfBounds {
                    destination: write.destination,
                    mapped_len: mapped.len(),
                });
            };
            target.copy_from_slice(write.source);
            written += write.source.len();
        }
        Ok(written)
    }

    /// Number of pending writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Total bytes the batch will write when flushed.
    pub fn pending_bytes(&self) -> u64 {
        self.writes.iter().map(|w| w.destination.size).sum()
    }
}
