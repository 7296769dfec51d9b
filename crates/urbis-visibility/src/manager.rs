//! Per-frame visibility rebuild: frustum culling, proximity override, and
//! LOD tier assignment over the full object bin.

use glam::{Mat4, Vec3};

use crate::frustum::{BOTTOM, Frustum, TOP};
use crate::object::{LodTier, ObjectId, RenderableDesc, RenderableObject};

/// Objects closer to the camera than this are kept active even when the
/// six-plane test rejects them. Bounding spheres are a poor fit for tall,
/// axis-unaligned building silhouettes, and the false negatives cluster
/// near the camera where pop-out is most visible.
pub const PROXIMITY_OVERRIDE: f32 = 100.0;

/// Clip-space Y convention of the active graphics backend.
///
/// The two supported backends disagree on which vertical clip plane an
/// object's height extent pushes against, so the top/bottom adjustments
/// swap between them. The assignment per variant is calibration data,
/// verified against each backend's clip convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipConvention {
    /// Clip-space Y increases upward: height extends the top-plane test.
    YUp,
    /// Clip-space Y increases downward: height extends the bottom-plane test.
    YDown,
}

impl ClipConvention {
    /// Radius adjustments for the (top, bottom) planes given an object's
    /// bounding radius and height extent.
    pub fn top_bottom_adjust(self, radius: f32, max_height: f32) -> (f32, f32) {
        match self {
            ClipConvention::YUp => (max_height + radius, radius),
            ClipConvention::YDown => (radius, max_height + radius),
        }
    }
}

/// Camera inputs read once per frame at the orchestrator boundary.
#[derive(Clone, Copy, Debug)]
pub struct CameraState {
    /// World-to-view transform.
    pub view: Mat4,
    /// View-to-clip transform.
    pub projection: Mat4,
    /// World-space camera position.
    pub position: Vec3,
}

impl CameraState {
    /// Combined view-projection matrix the frustum planes derive from.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Counters produced by one visibility rebuild.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Objects evaluated (the full bin size).
    pub tested: usize,
    /// Objects rejected by the frustum test.
    pub culled: usize,
    /// Objects placed in the active bin.
    pub active: usize,
    /// Active objects per LOD tier.
    pub per_tier: [usize; 3],
}

/// Owns the master list of renderables and rebuilds the active subset
/// every frame.
///
/// Objects enter the full bin once at registration and stay until the
/// manager is dropped; active-bin membership is recomputed from scratch
/// each frame, with no cross-frame hysteresis and no incremental update. The
/// full re-evaluation is O(n) over a few thousand objects, which is cheap
/// next to the draw work it gates.
pub struct VisibilityManager {
    convention: ClipConvention,
    /// Every registered object, in registration order.
    full: Vec<RenderableObject>,
    /// Indices into `full` for the objects active this frame, rebuilt and
    /// swapped wholesale so the previous frame's list is never mutated.
    active: Vec<usize>,
}

impl VisibilityManager {
    /// Create an empty manager culling with the given backend convention.
    pub fn new(convention: ClipConvention) -> Self {
        Self {
            convention,
            full: Vec::new(),
            active: Vec::new(),
        }
    }

    /// Add an object to the full bin. Objects are never removed before
    /// teardown; the returned id stays valid for the manager's lifetime.
    pub fn register(&mut self, desc: RenderableDesc) -> ObjectId {
        let id = ObjectId(self.full.len());
        self.full.push(RenderableObject::new(id, desc));
        id
    }

    /// Recompute visibility for every registered object.
    ///
    /// Extracts fresh frustum planes from the camera, then walks the full
    /// bin in registration order: each object gets its camera distance,
    /// LOD tier, and active flag rewritten, and the active bin is replaced
    /// atomically with the newly built list.
    pub fn rebuild(&mut self, camera: &CameraState) -> FrameStats {
        let frustum = Frustum::from_view_projection(&camera.view_projection());
        let convention = self.convention;

        let mut next_active = Vec::with_capacity(self.active.len().max(16));
        let mut stats = FrameStats {
            tested: self.full.len(),
            ..FrameStats::default()
        };

        for (index, object) in self.full.iter_mut().enumerate() {
            let distance = camera.position.distance(object.position);
            let visible = object.ignore_frustum
                || distance < PROXIMITY_OVERRIDE
                || in_frustum(&frustum, convention, object);

            object.distance_to_camera = distance;
            object.lod = LodTier::for_distance(distance);
            object.active = visible;

            if visible {
                stats.per_tier[object.lod.index()] += 1;
                next_active.push(index);
            } else {
                stats.culled += 1;
            }
        }

        stats.active = next_active.len();
        self.active = next_active;

        log::debug!(
            "visibility rebuild: {} tested, {} active, {} culled",
            stats.tested,
            stats.active,
            stats.culled
        );
        stats
    }

    /// The objects selected for rendering this frame, in full-bin order.
    pub fn active_bin(&self) -> impl Iterator<Item = &RenderableObject> {
        self.active.iter().map(|&index| &self.full[index])
    }

    /// Number of objects in the active bin.
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Look up a registered object.
    pub fn object(&self, id: ObjectId) -> Option<&RenderableObject> {
        self.full.get(id.0)
    }

    /// Number of registered objects.
    pub fn len(&self) -> usize {
        self.full.len()
    }

    /// Whether any objects are registered.
    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }

    /// The convention this manager was built with.
    pub fn clip_convention(&self) -> ClipConvention {
        self.convention
    }
}

/// Six-plane test with per-plane radius adjustment: side, near, and far
/// planes take the bounding radius; top and bottom take the
/// convention-dependent height adjustment. Any adjusted signed distance
/// at or below zero culls the object.
fn in_frustum(frustum: &Frustum, convention: ClipConvention, object: &RenderableObject) -> bool {
    let (top_adjust, bottom_adjust) =
        convention.top_bottom_adjust(object.bounding_radius, object.max_height);

    for plane in 0..6 {
        let adjust = match plane {
            TOP => top_adjust,
            BOTTOM => bottom_adjust,
            _ => object.bounding_radius,
        };
        if frustum.signed_distance(plane, object.position) + adjust <= 0.0 {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Camera at the origin looking down -Z.
    fn camera_at_origin() -> CameraState {
        CameraState {
            view: Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y),
            projection: Mat4::perspective_rh(
                std::f32::consts::FRAC_PI_4,
                16.0 / 9.0,
                0.1,
                5000.0,
            ),
            position: Vec3::ZERO,
        }
    }

    fn building(position: Vec3) -> RenderableDesc {
        RenderableDesc {
            position,
            bounding_radius: 10.0,
            max_height: 40.0,
            ignore_frustum: false,
        }
    }

    #[test]
    fn test_object_ahead_is_active() {
        let mut manager = VisibilityManager::new(ClipConvention::YUp);
        let id = manager.register(building(Vec3::new(0.0, 0.0, -300.0)));

        let stats = manager.rebuild(&camera_at_origin());

        assert_eq!(stats.active, 1);
        assert!(manager.object(id).unwrap().active);
    }

    #[test]
    fn test_object_far_behind_is_culled() {
        let mut manager = VisibilityManager::new(ClipConvention::YUp);
        let id = manager.register(building(Vec3::new(0.0, 0.0, 400.0)));

        let stats = manager.rebuild(&camera_at_origin());

        assert_eq!(stats.culled, 1);
        assert!(!manager.object(id).unwrap().active);
    }

    /// Outside the frustum at distance 99: the proximity override keeps it
    /// active. The same object at distance 101 is culled.
    #[test]
    fn test_proximity_override_boundary() {
        let mut manager = VisibilityManager::new(ClipConvention::YUp);
        let near = manager.register(building(Vec3::new(0.0, 0.0, 99.0)));
        let far = manager.register(building(Vec3::new(0.0, 0.0, 101.0)));

        manager.rebuild(&camera_at_origin());

        assert!(manager.object(near).unwrap().active, "99 units: kept");
        assert!(!manager.object(far).unwrap().active, "101 units: culled");
    }

    /// ignore_frustum objects stay active wherever the camera looks.
    #[test]
    fn test_ignore_frustum_always_active() {
        let mut manager = VisibilityManager::new(ClipConvention::YUp);
        let sky = manager.register(RenderableDesc {
            position: Vec3::new(0.0, 0.0, 3000.0), // far behind the camera
            bounding_radius: 1.0,
            max_height: 0.0,
            ignore_frustum: true,
        });

        let stats = manager.rebuild(&camera_at_origin());

        let object = manager.object(sky).unwrap();
        assert!(object.active);
        assert_eq!(stats.active, 1);
        // It still gets a distance and a tier like everything else.
        assert_eq!(object.lod, LodTier::Minimal);
        assert!((object.distance_to_camera - 3000.0).abs() < 1e-3);
    }

    /// LOD tiers follow camera distance across the fixed thresholds.
    #[test]
    fn test_lod_assignment_by_distance() {
        let mut manager = VisibilityManager::new(ClipConvention::YUp);
        let near = manager.register(building(Vec3::new(0.0, 0.0, -499.0)));
        let mid = manager.register(building(Vec3::new(0.0, 0.0, -999.0)));
        let far = manager.register(building(Vec3::new(0.0, 0.0, -1000.0)));

        manager.rebuild(&camera_at_origin());

        assert_eq!(manager.object(near).unwrap().lod, LodTier::Full);
        assert_eq!(manager.object(mid).unwrap().lod, LodTier::Reduced);
        assert_eq!(manager.object(far).unwrap().lod, LodTier::Minimal);
    }

    /// The active bin is rebuilt, not patched: an object leaving the view
    /// disappears from the next frame's bin.
    #[test]
    fn test_active_bin_swaps_per_frame() {
        let mut manager = VisibilityManager::new(ClipConvention::YUp);
        manager.register(building(Vec3::new(0.0, 0.0, -300.0)));
        manager.register(building(Vec3::new(0.0, 0.0, -600.0)));

        let stats = manager.rebuild(&camera_at_origin());
        assert_eq!(stats.active, 2);
        assert_eq!(manager.active_bin().count(), 2);

        // Turn the camera around: both buildings fall outside.
        let turned = CameraState {
            view: Mat4::look_at_rh(Vec3::ZERO, Vec3::Z, Vec3::Y),
            ..camera_at_origin()
        };
        let stats = manager.rebuild(&turned);
        assert_eq!(stats.active, 0);
        assert_eq!(manager.active_bin().count(), 0);
        assert_eq!(manager.len(), 2, "full bin never shrinks");
    }

    /// Active-bin iteration preserves full-bin (registration) order.
    #[test]
    fn test_active_bin_order_is_registration_order() {
        let mut manager = VisibilityManager::new(ClipConvention::YUp);
        let ids: Vec<ObjectId> = (0..5)
            .map(|i| manager.register(building(Vec3::new(i as f32 * 20.0, 0.0, -200.0))))
            .collect();

        manager.rebuild(&camera_at_origin());

        let seen: Vec<ObjectId> = manager.active_bin().map(|o| o.id).collect();
        assert_eq!(seen, ids);
    }

    /// The two conventions swap which vertical plane the height extends.
    #[test]
    fn test_convention_swaps_height_adjustment() {
        let (top, bottom) = ClipConvention::YUp.top_bottom_adjust(10.0, 40.0);
        assert_eq!((top, bottom), (50.0, 10.0));

        let (top, bottom) = ClipConvention::YDown.top_bottom_adjust(10.0, 40.0);
        assert_eq!((top, bottom), (10.0, 50.0));
    }

    /// A tall building just below the view gets pulled in by its height
    /// under YUp, where the height extends the top-plane test, but not
    /// under YDown.
    #[test]
    fn test_convention_affects_vertical_culling() {
        // Sitting slightly outside the top plane, far enough from the
        // camera that the proximity override does not apply.
        let position = Vec3::new(0.0, 180.0, -400.0);
        let tall = RenderableDesc {
            position,
            bounding_radius: 5.0,
            max_height: 120.0,
            ignore_frustum: false,
        };

        let mut with_height = VisibilityManager::new(ClipConvention::YUp);
        let id_up = with_height.register(tall);
        with_height.rebuild(&camera_at_origin());

        let mut without_height = VisibilityManager::new(ClipConvention::YDown);
        let id_down = without_height.register(tall);
        without_height.rebuild(&camera_at_origin());

        assert!(
            with_height.object(id_up).unwrap().active,
            "height extends the top-plane test under YUp"
        );
        assert!(
            !without_height.object(id_down).unwrap().active,
            "bare radius is not enough under YDown"
        );
    }

    #[test]
    fn test_stats_tier_counts() {
        let mut manager = VisibilityManager::new(ClipConvention::YUp);
        manager.register(building(Vec3::new(0.0, 0.0, -100.0)));
        manager.register(building(Vec3::new(0.0, 0.0, -700.0)));
        manager.register(building(Vec3::new(0.0, 0.0, -1500.0)));
        manager.register(building(Vec3::new(0.0, 0.0, 800.0))); // behind

        let stats = manager.rebuild(&camera_at_origin());

        assert_eq!(stats.tested, 4);
        assert_eq!(stats.active, 3);
        assert_eq!(stats.culled, 1);
        assert_eq!(stats.per_tier, [1, 1, 1]);
    }
}
