//! View-frustum plane extraction from a combined view-projection matrix.

use glam::{Mat4, Vec3, Vec4};

/// Plane indices into the frustum planes array.
pub const LEFT: usize = 0;
pub const RIGHT: usize = 1;
pub const BOTTOM: usize = 2;
pub const TOP: usize = 3;
pub const NEAR: usize = 4;
pub const FAR: usize = 5;

/// The six inward-pointing planes of a camera's view volume.
///
/// Each `Vec4(a, b, c, d)` holds the normalized inward normal `(a, b, c)`
/// and the signed distance term `d`. Extracted fresh every frame: the
/// camera moves, so planes are never cached across frames.
#[derive(Clone, Debug)]
pub struct Frustum {
    /// Six planes: left, right, bottom, top, near, far.
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a combined view-projection matrix using
    /// the Gribb-Hartmann row method: each clip plane is the fourth row of
    /// the matrix plus or minus one of the first three rows.
    pub fn from_view_projection(vp: &Mat4) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        let mut planes = [Vec4::ZERO; 6];
        planes[LEFT] = rows[3] + rows[0];
        planes[RIGHT] = rows[3] - rows[0];
        planes[BOTTOM] = rows[3] + rows[1];
        planes[TOP] = rows[3] - rows[1];
        planes[NEAR] = rows[3] + rows[2];
        planes[FAR] = rows[3] - rows[2];

        // Normalize so the signed distances below are in world units.
        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 1e-8 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    /// Signed distance from `point` to the given plane. Positive means the
    /// point is on the interior side.
    pub fn signed_distance(&self, plane: usize, point: Vec3) -> f32 {
        let p = self.planes[plane];
        p.truncate().dot(point) + p.w
    }

    /// The raw plane equations, indexed by the module's plane constants.
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looking_down_neg_z() -> Mat4 {
        let view = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
        let proj = Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 16.0 / 9.0, 0.1, 2000.0);
        proj * view
    }

    #[test]
    fn test_planes_are_normalized() {
        let frustum = Frustum::from_view_projection(&looking_down_neg_z());
        for plane in frustum.planes() {
            let len = plane.truncate().length();
            assert!(
                (len - 1.0).abs() < 1e-4,
                "plane normal not normalized: {len}"
            );
        }
    }

    #[test]
    fn test_point_in_view_is_inside_all_planes() {
        let frustum = Frustum::from_view_projection(&looking_down_neg_z());
        let point = Vec3::new(0.0, 0.0, -50.0);
        for plane in 0..6 {
            assert!(
                frustum.signed_distance(plane, point) > 0.0,
                "plane {plane} rejects a point dead ahead"
            );
        }
    }

    #[test]
    fn test_point_behind_camera_is_outside() {
        let frustum = Frustum::from_view_projection(&looking_down_neg_z());
        let behind = Vec3::new(0.0, 0.0, 50.0);
        let outside = (0..6).any(|p| frustum.signed_distance(p, behind) < 0.0);
        assert!(outside);
    }

    #[test]
    fn test_side_planes_reject_lateral_points() {
        let frustum = Frustum::from_view_projection(&looking_down_neg_z());

        let far_left = Vec3::new(-1000.0, 0.0, -50.0);
        assert!(frustum.signed_distance(LEFT, far_left) < 0.0);

        let far_right = Vec3::new(1000.0, 0.0, -50.0);
        assert!(frustum.signed_distance(RIGHT, far_right) < 0.0);

        let far_up = Vec3::new(0.0, 1000.0, -50.0);
        assert!(frustum.signed_distance(TOP, far_up) < 0.0);

        let far_down = Vec3::new(0.0, -1000.0, -50.0);
        assert!(frustum.signed_distance(BOTTOM, far_down) < 0.0);
    }

    #[test]
    fn test_far_plane_rejects_distant_points() {
        let frustum = Frustum::from_view_projection(&looking_down_neg_z());
        let beyond = Vec3::new(0.0, 0.0, -5000.0);
        assert!(frustum.signed_distance(FAR, beyond) < 0.0);
    }
}
