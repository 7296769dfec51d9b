//! Per-frame visibility and level-of-detail selection for the city renderer.
//!
//! Every frame the [`VisibilityManager`] re-extracts the camera frustum,
//! tests every registered object against it, and rebuilds the active bin
//! with a LOD tier per object. The math is backend-agnostic; the only
//! backend-specific input is the [`ClipConvention`] that decides which
//! vertical clip plane an object's height extent pushes against.

pub mod frustum;
mod manager;
mod object;

pub use frustum::Frustum;
pub use manager::{
    CameraState, ClipConvention, FrameStats, PROXIMITY_OVERRIDE, VisibilityManager,
};
pub use object::{LOD_FAR, LOD_NEAR, LodTier, ObjectId, RenderableDesc, RenderableObject};
