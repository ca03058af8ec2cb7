// Camera basis construction and the voxel-to-pixel projection sweep.
//
// Each render worker owns one pose, one basis and one frame buffer;
// nothing here is shared between workers.

use crate::field::VolumetricField;
use crate::vec3::{cross, dot, norm, normalize, sub};

// ============================================================================
// CAMERA POSE
// ============================================================================

// Camera position and viewing direction in world units.
//
// The direction need not be normalized; the basis builder takes care of
// that. Worker-private, rotated in place between frames.
#[derive(Debug, Clone, Copy)]
pub struct CameraPose {
    pub location: [f64; 3],
    pub direction: [f64; 3],
}

impl CameraPose {
    pub fn new(location: [f64; 3], direction: [f64; 3]) -> Self {
        Self { location, direction }
    }
}

// ============================================================================
// CAMERA BASIS
// ============================================================================

// Orthonormal camera frame derived from a pose.
//
// `normal` points along the view axis, `e1` and `e2` span the projection
// plane, and `tan_half_inv` = 1/tan(visang/2) scales in-plane offsets
// into normalized device coordinates.
//
// Invariant: normal, e1, e2 are pairwise orthogonal unit vectors (within
// floating-point tolerance). Precondition: the pose direction is
// non-zero; geometry is validated once at configuration time.
#[derive(Debug, Clone, Copy)]
pub struct CameraBasis {
    pub location: [f64; 3],
    pub normal: [f64; 3],
    pub e1: [f64; 3],
    pub e2: [f64; 3],
    pub tan_half_inv: f64,
}

impl CameraBasis {
    // Build the camera frame for a pose and vision angle (radians).
    //
    // When the normal's y component is exactly zero the direction lies
    // in the x-z plane and the general e1 formula would normalize a
    // zero vector; the fixed y unit vector is orthogonal there by
    // construction. Keep the branch.
    pub fn new(pose: &CameraPose, visang: f64) -> Self {
        let normal = normalize(pose.direction);

        let e1 = if normal[1] == 0.0 {
            [0.0, 1.0, 0.0]
        } else {
            normalize([normal[1], -normal[0], 0.0])
        };
        let e2 = cross(normal, e1);

        Self {
            location: pose.location,
            normal,
            e1,
            e2,
            tan_half_inv: 1.0 / (visang / 2.0).tan(),
        }
    }
}

// ============================================================================
// FRAME IMAGE
// ============================================================================

// Accumulation grid for one frame: height x width scalar bins.
//
// Workers clear and reuse one buffer across their whole frame range
// rather than reallocating in the projection hot loop.
pub struct FrameImage {
    pub height: usize,
    pub width: usize,
    data: Vec<f64>,
}

impl FrameImage {
    pub fn new(height: usize, width: usize) -> Self {
        assert!(height > 0 && width > 0, "Dimensions must be positive");
        Self {
            height,
            width,
            data: vec![0.0; height * width],
        }
    }

    // Reset every bin to zero, keeping the allocation.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    // Largest accumulated value in the frame.
    pub fn max(&self) -> f64 {
        self.data.iter().fold(f64::NEG_INFINITY, |m, &v| m.max(v))
    }

    // Number of non-zero bins.
    pub fn populated(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0.0).count()
    }
}

// ============================================================================
// PROJECTION
// ============================================================================

// Project every populated voxel of the field through the camera and
// accumulate its value into the pixel bin it lands in.
//
// Pinhole mapping: the in-plane offset (q1, q2) is scaled by the inverse
// distance to the voxel and the field-of-view factor, giving normalized
// device coordinates in [-1, 1], then shifted into pixel indices
// centered in the image. Voxels projecting outside the frame are
// silently discarded; voxels landing in the same bin sum.
//
// This sweep is O(pixels^3) and dominates the per-frame cost, which is
// why frames, not voxels, are spread across workers.
pub fn project_field(field: &VolumetricField, basis: &CameraBasis, image: &mut FrameImage) {
    let [dx, dy, dz] = field.spacing();
    let half_rows = image.height as f64 * 0.5;
    let half_cols = image.width as f64 * 0.5;

    for i in 0..field.pixels {
        let x = field.xmin + i as f64 * dx;
        for j in 0..field.pixels {
            let y = field.ymin + j as f64 * dy;
            for k in 0..field.pixels {
                // Ignore empty elements
                let value = field.at(i, j, k);
                if value == 0.0 {
                    continue;
                }
                let z = field.zmin + k as f64 * dz;

                let rcp = sub([x, y, z], basis.location);
                let dist_inv = 1.0 / norm(rcp);
                let f = dot(basis.normal, rcp);

                // Component of rcp in the view plane
                let q = [
                    rcp[0] - f * basis.normal[0],
                    rcp[1] - f * basis.normal[1],
                    rcp[2] - f * basis.normal[2],
                ];
                let q1 = dot(basis.e1, q);
                let q2 = dot(basis.e2, q);

                let row = (half_rows * (q2 * basis.tan_half_inv * dist_inv + 1.0)).round() as i64;
                let col = (half_cols * (q1 * basis.tan_half_inv * dist_inv + 1.0)).round() as i64;

                if row >= 0
                    && row < image.height as i64
                    && col >= 0
                    && col < image.width as i64
                {
                    image.data[row as usize * image.width + col as usize] += value;
                }
            }
        }
    }
}
