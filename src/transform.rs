//! Model, view, projection and screen matrix builders.
//!
//! Conventions: camera space looks down -Z, clip-space w is the
//! positive view depth, and after the perspective divide z maps
//! linearly onto [near, far] with smaller values nearer.

use crate::math::{Mat3, Mat4, Vec3};

/// Affine matrix placing an object's local frame into world space.
/// `orientation` holds the world images of the object's local X/Y/Z
/// axes as columns.
pub fn model_transform(position: Vec3, orientation: Mat3) -> Mat4 {
    let mut mat = Mat4::zero();
    for i in 0..3 {
        for j in 0..3 {
            mat[(i, j)] = orientation[(i, j)];
        }
        mat[(i, 3)] = position[i];
    }
    mat[(3, 3)] = 1.0;
    mat
}

/// World-to-camera matrix: rotation onto the orthonormal basis
/// `[dir x up, up, -dir]` composed with translation by `-camera_pos`.
///
/// `camera_dir` and `camera_up` must be non-parallel and non-zero;
/// the caller is expected to Gram-Schmidt-correct `up` against `dir`
/// beforehand.
pub fn view_transform(camera_pos: Vec3, camera_dir: Vec3, camera_up: Vec3) -> Mat4 {
    let dir = camera_dir.normalized();
    let up = camera_up.normalized();

    let basis = [dir.cross(&up), up, -dir];

    let mut rotation = Mat4::zero();
    for (row, axis) in basis.iter().enumerate() {
        for col in 0..3 {
            rotation[(row, col)] = axis[col];
        }
    }
    rotation[(3, 3)] = 1.0;

    let mut translation = Mat4::identity();
    for i in 0..3 {
        translation[(i, 3)] = -camera_pos[i];
    }

    rotation * translation
}

/// Perspective-to-homogeneous-clip matrix. `near` and `far` are
/// positive distances along the viewing axis; clip w comes out as the
/// positive view depth, so points in front of the camera keep w > 0.
pub fn projection_transform(near: f64, far: f64) -> Mat4 {
    let mut mat = Mat4::zero();
    mat[(0, 0)] = near;
    mat[(1, 1)] = near;
    mat[(2, 2)] = -(near + far);
    mat[(2, 3)] = -near * far;
    mat[(3, 2)] = -1.0;
    mat
}

/// Scaling that maps the visible frustum to [-1, 1] on both axes.
/// `fov_y` is the vertical field of view in radians.
pub fn screen_transform(fov_y: f64, aspect_ratio: f64, near: f64) -> Mat4 {
    let h = 2.0 * (fov_y / 2.0).tan() * near;
    let w = aspect_ratio * h;

    let mut mat = Mat4::identity();
    mat[(0, 0)] = 2.0 / w;
    mat[(1, 1)] = 2.0 / h;
    mat
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Matrix, Vec4};

    const EPS: f64 = 1e-9;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert!((a - b).norm() < EPS, "{a:?} != {b:?}");
    }

    #[test]
    fn test_model_transform_places_local_frame() {
        // Local X becomes world Y, local Y becomes world -X.
        let orientation = Matrix([[0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        let m = model_transform(Vec3::new(5.0, 0.0, 0.0), orientation);
        let p = (m * Vec3::new(1.0, 0.0, 0.0).to_vec4_point()).to_vec3_point();
        assert_vec3_eq(p, Vec3::new(5.0, 1.0, 0.0));
    }

    #[test]
    fn test_view_transform_maps_forward_to_negative_z() {
        let pos = Vec3::new(1.0, 2.0, 3.0);
        let dir = Vec3::new(0.0, 0.0, -1.0);
        let up = Vec3::new(0.0, 1.0, 0.0);
        let v = view_transform(pos, dir, up);

        let ahead = pos + dir * 5.0;
        let cam = (v * ahead.to_vec4_point()).to_vec3_point();
        assert_vec3_eq(cam, Vec3::new(0.0, 0.0, -5.0));

        let above = pos + up * 2.0;
        let cam = (v * above.to_vec4_point()).to_vec3_point();
        assert_vec3_eq(cam, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_projection_z_maps_linearly_between_near_and_far() {
        let (near, far) = (1.0, 10.0);
        let p = projection_transform(near, far);

        for (d, expected) in [(near, near), (far, far), (5.5, (near + far) - near * far / 5.5)] {
            let clip = p * Vec4::new(0.0, 0.0, -d, 1.0);
            assert!(clip.w() > 0.0, "w must be positive in front of the camera");
            assert!((clip.to_vec3_point().z() - expected).abs() < EPS);
        }
    }

    #[test]
    fn test_frustum_edge_maps_to_unit_range() {
        let fov_y = std::f64::consts::FRAC_PI_2;
        let (near, far) = (1.0, 10.0);
        let combined = screen_transform(fov_y, 1.0, near) * projection_transform(near, far);

        // At depth d the frustum half-height is d * tan(fov/2) = d.
        let d = 4.0;
        let clip = combined * Vec4::new(0.0, d, -d, 1.0);
        assert!((clip.to_vec3_point().y() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_view_matrix_invertible() {
        let v = view_transform(
            Vec3::new(2.0, 16.0, 13.0),
            Vec3::new(-2.0, -2.0, -10.0),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let inv = v.inverted().unwrap();
        let p = inv * v;
        let id = Mat4::identity();
        for i in 0..4 {
            for j in 0..4 {
                assert!((p[(i, j)] - id[(i, j)]).abs() < 1e-9);
            }
        }
    }
}
