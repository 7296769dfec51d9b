//! Scoped ownership of arena-backed GPU resources.
//!
//! A [`ResourcePool`] owns one [`Arena`] and every block carved from it for
//! textures. Creating a texture acquires its block and destroying it
//! releases the block; whatever is still alive when the pool drops is
//! released then, so a block cannot outlive its arena. A leak at teardown
//! is therefore a pool bug, and the arena's own drop check reports it.

use urbis_alloc::{Arena, ArenaError, Block};

use crate::backend::{RenderBackend, TextureHandle};

/// Errors from resource-pool operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The underlying arena rejected the operation.
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// A texture handle this pool never created (or already destroyed).
    #[error("texture {handle} was not created by this pool")]
    UnknownTexture {
        /// The rejected handle value.
        handle: u32,
    },
}

struct TextureEntry {
    handle: TextureHandle,
    block: Block,
}

/// Owns a device arena and the texture blocks carved from it.
pub struct ResourcePool {
    arena: Arena,
    live: Vec<TextureEntry>,
}

impl ResourcePool {
    /// Create a pool over a fresh arena of `capacity` bytes.
    pub fn new(label: impl Into<String>, capacity: u64) -> Self {
        Self {
            arena: Arena::new(label, capacity),
            live: Vec::new(),
        }
    }

    /// Allocate pixel storage and create a texture over it.
    ///
    /// The allocation coalesces-and-retries once on fragmentation; a
    /// second failure means the pool is exhausted and the error propagates
    /// to the caller, which must not silently drop the resource request.
    pub fn create_texture<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        width: u32,
        height: u32,
        bytes_per_texel: u32,
    ) -> Result<TextureHandle, PoolError> {
        let size = u64::from(width) * u64::from(height) * u64::from(bytes_per_texel);
        let block = self.arena.acquire_or_coalesce(size)?;
        let handle = backend.create_texture(block, width, height);
        self.live.push(TextureEntry { handle, block });
        Ok(handle)
    }

    /// Release the block behind a texture created by this pool.
    pub fn destroy_texture(&mut self, handle: TextureHandle) -> Result<(), PoolError> {
        let Some(index) = self.live.iter().position(|e| e.handle == handle) else {
            return Err(PoolError::UnknownTexture { handle: handle.0 });
        };
        let entry = self.live.swap_remove(index);
        self.arena.release(entry.block)?;
        Ok(())
    }

    /// The block backing a live texture.
    pub fn texture_block(&self, handle: TextureHandle) -> Option<Block> {
        self.live
            .iter()
            .find(|e| e.handle == handle)
            .map(|e| e.block)
    }

    /// Number of live textures.
    pub fn live_textures(&self) -> usize {
        self.live.len()
    }

    /// The underlying arena, for stats reporting.
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Merge the arena's free fragments. Called at frame boundaries.
    pub fn coalesce(&mut self) {
        self.arena.coalesce();
    }
}

impl Drop for ResourcePool {
    fn drop(&mut self) {
        // Release everything still alive so the arena tears down clean.
        for entry in self.live.drain(..) {
            if let Err(err) = self.arena.release(entry.block) {
                log::warn!(
                    "resource pool '{}': release at teardown failed: {err}",
                    self.arena.label()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessBackend;
    use urbis_visibility::ClipConvention;

    fn backend() -> HeadlessBackend {
        HeadlessBackend::new(ClipConvention::YUp, 1 << 20, 1 << 12)
    }

    #[test]
    fn test_create_and_destroy_balances_arena() {
        let mut backend = backend();
        let mut pool = ResourcePool::new("device", 1 << 20);

        let texture = pool.create_texture(&mut backend, 64, 64, 4).unwrap();
        assert_eq!(pool.arena().bytes_used(), 64 * 64 * 4);
        assert_eq!(pool.live_textures(), 1);
        assert_eq!(
            pool.texture_block(texture).map(|b| b.size),
            Some(64 * 64 * 4)
        );

        pool.destroy_texture(texture).unwrap();
        assert_eq!(pool.arena().bytes_used(), 0);
        assert_eq!(pool.live_textures(), 0);
    }

    #[test]
    fn test_destroy_unknown_handle_fails() {
        let mut pool = ResourcePool::new("device", 1 << 20);
        assert_eq!(
            pool.destroy_texture(TextureHandle(3)),
            Err(PoolError::UnknownTexture { handle: 3 })
        );
    }

    #[test]
    fn test_pool_exhaustion_propagates() {
        let mut backend = backend();
        // Room for one 64x64 RGBA texture, not two.
        let mut pool = ResourcePool::new("device", 64 * 64 * 4 + 100);

        pool.create_texture(&mut backend, 64, 64, 4).unwrap();
        let err = pool.create_texture(&mut backend, 64, 64, 4).unwrap_err();
        assert!(matches!(err, PoolError::Arena(ArenaError::OutOfMemory { .. })));
    }

    /// Fragmented pool: destroy-then-create succeeds because the pool's
    /// allocation path coalesces and retries.
    #[test]
    fn test_fragmented_pool_recovers_through_coalesce() {
        let mut backend = backend();
        let mut pool = ResourcePool::new("device", 3000);

        let a = pool.create_texture(&mut backend, 10, 10, 10).unwrap(); // 1000 bytes
        let b = pool.create_texture(&mut backend, 10, 10, 10).unwrap();
        let c = pool.create_texture(&mut backend, 10, 10, 10).unwrap();

        pool.destroy_texture(a).unwrap();
        pool.destroy_texture(b).unwrap();
        pool.destroy_texture(c).unwrap();

        // 2500 bytes only fit after the three 1000-byte fragments merge.
        let big = pool.create_texture(&mut backend, 25, 10, 10).unwrap();
        assert_eq!(pool.texture_block(big).map(|b| b.size), Some(2500));
    }

    /// Dropping the pool releases live blocks; the arena sees no leak.
    #[test]
    fn test_drop_releases_live_textures() {
        let mut backend = backend();
        let mut pool = ResourcePool::new("device", 1 << 20);
        pool.create_texture(&mut backend, 32, 32, 4).unwrap();
        pool.create_texture(&mut backend, 16, 16, 4).unwrap();
        assert_eq!(pool.arena().blocks_outstanding(), 2);
        drop(pool); // arena drop check passes: no outstanding blocks
    }
}
