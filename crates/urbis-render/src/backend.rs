//! The backend capability interface.
//!
//! Everything above this trait (allocation, visibility, upload batching)
//! is backend-agnostic; everything below it calls one concrete graphics
//! API. A backend supplies texture/view creation over arena blocks, frame
//! clears, and mapped access to its memory pools, and reports which
//! clip-space convention its projection uses.

use urbis_alloc::Block;
use urbis_visibility::ClipConvention;

/// Which fixed memory pool an operation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoolKind {
    /// Device-local memory: textures, long-lived geometry.
    Device,
    /// Host-visible memory: per-frame instance and upload data.
    Host,
}

/// Errors surfaced at the backend boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// Mapping a pool's memory failed. Unrecoverable for the current
    /// frame: the caller abandons the flush rather than applying a
    /// partial batch.
    #[error("mapping {pool:?} pool memory failed")]
    MapFailed {
        /// The pool that could not be mapped.
        pool: PoolKind,
    },

    /// A texture handle that this backend never issued (or already
    /// destroyed).
    #[error("unknown texture handle {handle}")]
    UnknownTexture {
        /// The rejected handle value.
        handle: u32,
    },
}

/// Opaque handle to a backend texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Opaque handle to a sampled view over a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ViewHandle(pub u32);

/// Operations every graphics backend must supply.
///
/// Two interchangeable implementations exist per target platform; the
/// core never depends on which one is live. Backends are driven from the
/// frame-loop thread only, matching the single-threaded contract of the
/// arena and visibility crates.
pub trait RenderBackend {
    /// The clip-space Y convention of this backend's projection, consumed
    /// by the visibility manager's top/bottom plane tests.
    fn clip_convention(&self) -> ClipConvention;

    /// Create a texture whose pixel storage is `block` of the device pool.
    fn create_texture(&mut self, block: Block, width: u32, height: u32) -> TextureHandle;

    /// Create a sampled view over an existing texture.
    fn create_view(&mut self, texture: TextureHandle) -> Result<ViewHandle, BackendError>;

    /// Map a pool's memory for CPU writes. The returned slice covers the
    /// whole pool; an [`urbis_alloc::UploadQueue`] flush against it lands
    /// each write at its block's offset.
    fn map_pool(&mut self, pool: PoolKind) -> Result<&mut [u8], BackendError>;

    /// Drop any staged-but-unflushed upload state.
    fn clear_upload(&mut self);

    /// Clear the current render target to a solid color.
    fn clear(&mut self, color: [f32; 4]);
}
