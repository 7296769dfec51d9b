//! Fixed-capacity memory arena with first-fit sub-allocation and deferred
//! coalescing.
//!
//! An [`Arena`] owns one byte range of GPU (or staging) memory and hands out
//! [`Block`]s from it. The pool is sized once at construction and never
//! grows; it is tuned for a small number of long-lived, size-varying
//! allocations (textures, instance buffers), so `acquire` is a linear
//! first-fit scan and free-list maintenance is deferred to explicit
//! [`Arena::coalesce`] calls at frame boundaries.

use crate::block::Block;
use crate::error::ArenaError;

/// A fixed-capacity byte range that sub-allocates [`Block`]s.
///
/// The free and used sets partition `[0, capacity)` at all times:
/// `bytes_free() + bytes_used() == capacity()` holds after every operation.
pub struct Arena {
    /// Diagnostic name, used in leak reports.
    label: String,
    /// Total byte capacity, fixed at construction.
    capacity: u64,
    /// Free blocks. Order is insertion order between coalesces; `coalesce`
    /// restores address order.
    free: Vec<Block>,
    /// Blocks handed out by `acquire` and not yet released.
    used: Vec<Block>,
}

impl Arena {
    /// Create an arena spanning `[0, capacity)` with a single free block.
    pub fn new(label: impl Into<String>, capacity: u64) -> Self {
        Self {
            label: label.into(),
            capacity,
            free: vec![Block::new(0, capacity)],
            used: Vec::new(),
        }
    }

    /// Sub-allocate `size` bytes using a first-fit scan of the free list.
    ///
    /// The low `size` bytes of the first sufficiently large free block are
    /// carved into the returned block; the remainder, if any, stays free.
    /// Fails with [`ArenaError::OutOfMemory`] when no free block is large
    /// enough; callers may [`Arena::coalesce`] and retry once, after which
    /// the pool is genuinely exhausted.
    pub fn acquire(&mut self, size: u64) -> Result<Block, ArenaError> {
        if size == 0 {
            return Err(ArenaError::ZeroSize);
        }

        let Some(index) = self.free.iter().position(|b| b.size >= size) else {
            let largest_free = self.largest_free();
            log::error!(
                "arena '{}' out of memory: requested {size} bytes, largest free {largest_free}",
                self.label
            );
            return Err(ArenaError::OutOfMemory {
                requested: size,
                largest_free,
            });
        };

        let found = self.free[index];
        let block = Block::new(found.start, size);
        if found.size == size {
            // Index-based removal, no iterator invalidation to worry about.
            self.free.swap_remove(index);
        } else {
            self.free[index] = Block::new(found.start + size, found.size - size);
        }
        self.used.push(block);
        Ok(block)
    }

    /// [`Arena::acquire`], retried once after a [`Arena::coalesce`] if the
    /// first attempt runs out of memory.
    pub fn acquire_or_coalesce(&mut self, size: u64) -> Result<Block, ArenaError> {
        match self.acquire(size) {
            Err(ArenaError::OutOfMemory { .. }) => {
                log::debug!(
                    "arena '{}': first-fit miss for {size} bytes, coalescing and retrying",
                    self.label
                );
                self.coalesce();
                self.acquire(size)
            }
            result => result,
        }
    }

    /// Return a previously acquired block to the free list.
    ///
    /// The block is matched by its start offset against the used set.
    /// Fails with [`ArenaError::UnknownBlock`] on a double free or a block
    /// from another arena. No merging happens here; adjacent free blocks
    /// stay fragmented until the next [`Arena::coalesce`].
    pub fn release(&mut self, block: Block) -> Result<(), ArenaError> {
        let Some(index) = self.used.iter().position(|b| b.start == block.start) else {
            // Double free or foreign block: a logic error in the caller,
            // reported rather than crashed on.
            log::error!(
                "arena '{}': release of unknown block at offset {}",
                self.label,
                block.start
            );
            return Err(ArenaError::UnknownBlock { start: block.start });
        };

        let found = self.used.swap_remove(index);
        self.free.push(found);
        Ok(())
    }

    /// Merge adjacent free blocks.
    ///
    /// Sorts the free list by start offset, then folds every
    /// `a.end() == b.start` pair into one block. Idempotent: a second call
    /// on an already-coalesced list changes nothing. Invoked at frame
    /// boundaries or on allocation failure rather than after every release,
    /// so a burst of releases (level unload) pays for one sort, not many.
    pub fn coalesce(&mut self) {
        self.free.sort_unstable();

        let mut merged: Vec<Block> = Vec::with_capacity(self.free.len());
        for block in std::mem::take(&mut self.free) {
            match merged.last_mut() {
                Some(last) if last.adjacent_to(&block) => last.size += block.size,
                _ => merged.push(block),
            }
        }
        self.free = merged;
    }

    /// Diagnostic label given at construction.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Total capacity in bytes, fixed at construction.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Bytes currently handed out.
    pub fn bytes_used(&self) -> u64 {
        self.used.iter().map(|b| b.size).sum()
    }

    /// Bytes currently free (possibly fragmented).
    pub fn bytes_free(&self) -> u64 {
        self.free.iter().map(|b| b.size).sum()
    }

    /// Size of the largest single free block. An `acquire` above this
    /// fails even when `bytes_free()` would cover it.
    pub fn largest_free(&self) -> u64 {
        self.free.iter().map(|b| b.size).max().unwrap_or(0)
    }

    /// Number of fragments in the free list.
    pub fn free_fragments(&self) -> usize {
        self.free.len()
    }

    /// Number of blocks acquired and not yet released.
    pub fn blocks_outstanding(&self) -> usize {
        self.used.len()
    }

    /// The free set, in current storage order.
    pub fn free_blocks(&self) -> &[Block] {
        &self.free
    }

    /// The used set, in current storage order.
    pub fn used_blocks(&self) -> &[Block] {
        &self.used
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        // Outstanding blocks at teardown are a leak in the owning resource
        // pool. Report it; the memory itself goes away with the arena.
        if !self.used.is_empty() {
            log::warn!(
                "arena '{}' dropped with {} outstanding blocks ({} bytes leaked)",
                self.label,
                self.used.len(),
                self.bytes_used()
            );
        }
    }
}
