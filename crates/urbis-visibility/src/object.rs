//! Renderable-object records and distance-based LOD tiers.

use glam::Vec3;

/// Distance below which an object is assigned [`LodTier::Full`].
pub const LOD_NEAR: f32 = 500.0;
/// Distance below which an object is assigned [`LodTier::Reduced`]
/// (and at or beyond which it drops to [`LodTier::Minimal`]).
pub const LOD_FAR: f32 = 1000.0;

/// Detail tier for a renderable, chosen by distance from the camera.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LodTier {
    /// Full-detail geometry and shading.
    Full = 0,
    /// Reduced geometry, simplified materials.
    Reduced = 1,
    /// Far-distance stand-in (billboard / footprint box).
    Minimal = 2,
}

impl LodTier {
    /// Select the tier for a camera distance. Boundaries are half-open:
    /// `< 500` is full detail, `< 1000` is reduced, everything else minimal.
    /// The thresholds are constants of the renderer, not per-object data.
    pub fn for_distance(distance: f32) -> Self {
        if distance < LOD_NEAR {
            LodTier::Full
        } else if distance < LOD_FAR {
            LodTier::Reduced
        } else {
            LodTier::Minimal
        }
    }

    /// Tier as an array index (0, 1, 2).
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Identifier of a registered renderable. Stable for the life of the
/// owning manager; objects are never unregistered before teardown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) usize);

impl ObjectId {
    /// Position of the object in the manager's full bin.
    pub fn index(self) -> usize {
        self.0
    }
}

/// The scene-owned shape of a renderable, handed over at registration.
#[derive(Clone, Copy, Debug)]
pub struct RenderableDesc {
    /// World-space center of the object's bounding sphere.
    pub position: Vec3,
    /// Radius of the bounding sphere.
    pub bounding_radius: f32,
    /// Vertical extent above `position`. Building silhouettes are much
    /// taller than their footprint radius, so the top/bottom plane tests
    /// account for height separately.
    pub max_height: f32,
    /// Skip the frustum test entirely; the object renders every frame
    /// (sky domes and other camera-tracking effects).
    pub ignore_frustum: bool,
}

/// A registered renderable plus its per-frame visibility-derived state.
///
/// Identity (`id`, position, bounds) belongs to the scene; the manager owns
/// only `distance_to_camera`, `lod`, `active`, and active-bin membership,
/// all rewritten on every rebuild.
#[derive(Clone, Copy, Debug)]
pub struct RenderableObject {
    /// Stable identifier assigned at registration.
    pub id: ObjectId,
    /// World-space center of the bounding sphere.
    pub position: Vec3,
    /// Radius of the bounding sphere.
    pub bounding_radius: f32,
    /// Vertical extent above `position`.
    pub max_height: f32,
    /// Unconditionally active when set.
    pub ignore_frustum: bool,
    /// Distance to the camera as of the last rebuild.
    pub distance_to_camera: f32,
    /// Detail tier as of the last rebuild.
    pub lod: LodTier,
    /// Whether the object made the active bin in the last rebuild.
    pub active: bool,
}

impl RenderableObject {
    pub(crate) fn new(id: ObjectId, desc: RenderableDesc) -> Self {
        Self {
            id,
            position: desc.position,
            bounding_radius: desc.bounding_radius,
            max_height: desc.max_height,
            ignore_frustum: desc.ignore_frustum,
            distance_to_camera: 0.0,
            lod: LodTier::Full,
            active: false,
        }
    }
}
