//! A backend with no GPU behind it.
//!
//! Pools are plain host memory and textures are bookkeeping entries, so
//! the whole allocation/upload/visibility path runs in tests and tools on
//! machines with no graphics device at all. The headless backend is also
//! the reference implementation for the [`RenderBackend`] contract.

use urbis_alloc::Block;
use urbis_visibility::ClipConvention;

use crate::backend::{BackendError, PoolKind, RenderBackend, TextureHandle, ViewHandle};

struct TextureRecord {
    block: Block,
    width: u32,
    height: u32,
}

/// In-memory [`RenderBackend`] implementation.
pub struct HeadlessBackend {
    convention: ClipConvention,
    device: Vec<u8>,
    host: Vec<u8>,
    textures: Vec<TextureRecord>,
    /// Each view records the index of the texture it samples.
    views: Vec<u32>,
    last_clear: Option<[f32; 4]>,
    staged_upload_bytes: usize,
    fail_maps: bool,
}

impl HeadlessBackend {
    /// Create a headless backend with the given pool capacities in bytes.
    pub fn new(convention: ClipConvention, device_capacity: usize, host_capacity: usize) -> Self {
        Self {
            convention,
            device: vec![0; device_capacity],
            host: vec![0; host_capacity],
            textures: Vec::new(),
            views: Vec::new(),
            last_clear: None,
            staged_upload_bytes: 0,
            fail_maps: false,
        }
    }

    /// Make every subsequent `map_pool` fail, to exercise the fatal
    /// flush path without a real driver error.
    pub fn simulate_map_failure(&mut self) {
        self.fail_maps = true;
    }

    /// Read back a block of the host pool (test observation point).
    pub fn host_bytes(&self, block: Block) -> &[u8] {
        &self.host[block.start as usize..block.end() as usize]
    }

    /// The color of the most recent `clear`, if any.
    pub fn last_clear(&self) -> Option<[f32; 4]> {
        self.last_clear
    }

    /// Number of live texture records.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Dimensions of a texture, if the handle is known.
    pub fn texture_extent(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.textures
            .get(texture.0 as usize)
            .map(|t| (t.width, t.height))
    }

    /// Record bytes as staged for upload; `clear_upload` discards them.
    pub fn stage_upload(&mut self, bytes: usize) {
        self.staged_upload_bytes += bytes;
    }

    /// Bytes currently staged and not yet cleared.
    pub fn staged_upload_bytes(&self) -> usize {
        self.staged_upload_bytes
    }
}

impl RenderBackend for HeadlessBackend {
    fn clip_convention(&self) -> ClipConvention {
        self.convention
    }

    fn create_texture(&mut self, block: Block, width: u32, height: u32) -> TextureHandle {
        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(TextureRecord {
            block,
            width,
            height,
        });
        log::debug!(
            "headless: texture {} ({width}x{height}) over [{}, {})",
            handle.0,
            block.start,
            block.end()
        );
        handle
    }

    fn create_view(&mut self, texture: TextureHandle) -> Result<ViewHandle, BackendError> {
        if texture.0 as usize >= self.textures.len() {
            return Err(BackendError::UnknownTexture { handle: texture.0 });
        }
        let view = ViewHandle(self.views.len() as u32);
        self.views.push(texture.0);
        Ok(view)
    }

    fn map_pool(&mut self, pool: PoolKind) -> Result<&mut [u8], BackendError> {
        if self.fail_maps {
            return Err(BackendError::MapFailed { pool });
        }
        match pool {
            PoolKind::Device => Ok(&mut self.device),
            PoolKind::Host => Ok(&mut self.host),
        }
    }

    fn clear_upload(&mut self) {
        self.staged_upload_bytes = 0;
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.last_clear = Some(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use urbis_alloc::{Arena, UploadQueue};

    fn backend() -> HeadlessBackend {
        HeadlessBackend::new(ClipConvention::YUp, 1 << 16, 1 << 12)
    }

    /// The full upload path: acquire a block, enqueue bytes, flush against
    /// the mapped host pool, read the bytes back at the block's offset.
    #[test]
    fn test_arena_upload_flush_round_trip() {
        let mut backend = backend();
        let mut arena = Arena::new("host", 1 << 12);

        let first = arena.acquire(4).unwrap();
        let second = arena.acquire(8).unwrap();

        let mut queue = UploadQueue::new();
        queue.enqueue(first, &[1, 2, 3, 4]).unwrap();
        queue.enqueue(second, &[9; 8]).unwrap();

        let mapped = backend.map_pool(PoolKind::Host).unwrap();
        let written = queue.flush(mapped).unwrap();
        assert_eq!(written, 12);

        assert_eq!(backend.host_bytes(first), &[1, 2, 3, 4]);
        assert_eq!(backend.host_bytes(second), &[9; 8]);

        arena.release(first).unwrap();
        arena.release(second).unwrap();
    }

    #[test]
    fn test_map_failure_is_surfaced() {
        let mut backend = backend();
        backend.simulate_map_failure();
        assert_eq!(
            backend.map_pool(PoolKind::Host),
            Err(BackendError::MapFailed {
                pool: PoolKind::Host
            })
        );
    }

    #[test]
    fn test_view_over_unknown_texture_rejected() {
        let mut backend = backend();
        let err = backend.create_view(TextureHandle(7)).unwrap_err();
        assert_eq!(err, BackendError::UnknownTexture { handle: 7 });
    }

    #[test]
    fn test_texture_and_view_bookkeeping() {
        let mut backend = backend();
        let texture = backend.create_texture(Block::new(0, 4096), 32, 32);
        let view = backend.create_view(texture).unwrap();

        assert_eq!(backend.texture_count(), 1);
        assert_eq!(backend.texture_extent(texture), Some((32, 32)));
        assert_eq!(view, ViewHandle(0));
    }

    #[test]
    fn test_clear_and_clear_upload() {
        let mut backend = backend();
        backend.clear([0.1, 0.2, 0.3, 1.0]);
        assert_eq!(backend.last_clear(), Some([0.1, 0.2, 0.3, 1.0]));

        backend.stage_upload(128);
        assert_eq!(backend.staged_upload_bytes(), 128);
        backend.clear_upload();
        assert_eq!(backend.staged_upload_bytes(), 0);
    }
}
