// Rigid rotation of the camera pose about an arbitrary axis.

use crate::vec3::{normalize, sub};

// Rodrigues rotation matrix for a unit axis u and angle (radians).
//
// R = cos θ · I + sin θ · [u]× + (1 − cos θ) · u uᵀ
fn rotation_matrix(angle: f64, u: [f64; 3]) -> [[f64; 3]; 3] {
    let (s, c) = angle.sin_cos();
    let t = 1.0 - c;
    let [ux, uy, uz] = u;

    [
        [c + ux * ux * t, ux * uy * t - uz * s, ux * uz * t + uy * s],
        [uy * ux * t + uz * s, c + uy * uy * t, uy * uz * t - ux * s],
        [uz * ux * t - uy * s, uz * uy * t + ux * s, c + uz * uz * t],
    ]
}

#[inline]
fn apply(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

// Rotate a location/direction pair by `angle` around `axis`.
//
// The location orbits `pivot` (translate to the pivot frame, rotate,
// translate back); the direction is axis-relative and rotates in place
// without translation. The axis need not be unit length but must be
// non-zero -- validated once at configuration time.
pub fn rotate_pair(
    angle: f64,
    loc: &mut [f64; 3],
    dir: &mut [f64; 3],
    pivot: [f64; 3],
    axis: [f64; 3],
) {
    let u = normalize(axis);
    let m = rotation_matrix(angle, u);

    let rel = apply(&m, sub(*loc, pivot));
    *loc = [rel[0] + pivot[0], rel[1] + pivot[1], rel[2] + pivot[2]];
    *dir = apply(&m, *dir);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const TOL: f64 = 1e-9;

    fn assert_close(a: [f64; 3], b: [f64; 3], what: &str) {
        for c in 0..3 {
            assert!(
                (a[c] - b[c]).abs() < TOL,
                "{what}: component {c} differs ({} vs {})",
                a[c],
                b[c]
            );
        }
    }

    #[test]
    fn test_quarter_turn_about_z() {
        let mut loc = [1.0, 0.0, 0.0];
        let mut dir = [0.0, 1.0, 0.0];
        rotate_pair(FRAC_PI_2, &mut loc, &mut dir, [0.0; 3], [0.0, 0.0, 1.0]);

        assert_close(loc, [0.0, 1.0, 0.0], "x axis rotates onto y");
        assert_close(dir, [-1.0, 0.0, 0.0], "y axis rotates onto -x");
    }

    #[test]
    fn test_pivot_offsets_location_only() {
        let pivot = [1.0, 1.0, 0.0];
        let mut loc = [2.0, 1.0, 0.0];
        let mut dir = [1.0, 0.0, 0.0];
        rotate_pair(PI, &mut loc, &mut dir, pivot, [0.0, 0.0, 1.0]);

        assert_close(loc, [0.0, 1.0, 0.0], "location reflects through the pivot");
        assert_close(dir, [-1.0, 0.0, 0.0], "direction ignores the pivot");
    }

    #[test]
    fn test_round_trip_restores_inputs() {
        let angle = 0.7321;
        let pivot = [0.3, -1.2, 0.9];
        let axis = [1.0, 2.0, -0.5]; // deliberately not unit length

        let mut loc = [2.0, 0.5, -1.0];
        let mut dir = [0.4, 0.5, 0.0];
        let (loc0, dir0) = (loc, dir);

        rotate_pair(angle, &mut loc, &mut dir, pivot, axis);
        rotate_pair(-angle, &mut loc, &mut dir, pivot, axis);

        assert_close(loc, loc0, "rotating by theta then -theta restores the location");
        assert_close(dir, dir0, "rotating by theta then -theta restores the direction");
    }

    #[test]
    fn test_rotation_preserves_length() {
        let mut loc = [0.0; 3];
        let mut dir = [0.3, -0.4, 1.2];
        let before = crate::vec3::norm(dir);
        rotate_pair(1.234, &mut loc, &mut dir, [0.0; 3], [0.2, 0.9, 0.1]);
        assert!(
            (crate::vec3::norm(dir) - before).abs() < TOL,
            "rotation must not change vector length"
        );
    }

    #[test]
    fn test_axis_vectors_are_fixed_points() {
        let mut loc = [0.0, 0.0, 3.0];
        let mut dir = [0.0, 0.0, -2.0];
        rotate_pair(2.1, &mut loc, &mut dir, [0.0; 3], [0.0, 0.0, 1.0]);
        assert_close(loc, [0.0, 0.0, 3.0], "points on the axis stay put");
        assert_close(dir, [0.0, 0.0, -2.0], "directions along the axis stay put");
    }
}
