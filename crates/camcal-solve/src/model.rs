//! Pinhole camera with 5-coefficient Brown-Conrady distortion.
//!
//! Parameter vector layout used throughout the solver:
//! `[fx, fy, cx, cy, k1, k2, p1, p2, k3]` for the camera, then
//! `[rx, ry, rz, tx, ty, tz]` (axis-angle, translation) per view.

use nalgebra::{Point2, Rotation3, Vector3};

pub const INTRINSIC_PARAMS: usize = 9;
pub const POSE_PARAMS: usize = 6;

/// Distort a normalized image point (OpenCV ordering `k1, k2, p1, p2, k3`).
#[inline]
pub fn distort(x: f64, y: f64, dist: &[f64]) -> (f64, f64) {
    let (k1, k2, p1, p2, k3) = (dist[0], dist[1], dist[2], dist[3], dist[4]);
    let r2 = x * x + y * y;
    let radial = 1.0 + r2 * (k1 + r2 * (k2 + r2 * k3));
    let xd = x * radial + 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
    let yd = y * radial + p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;
    (xd, yd)
}

/// Rotation and translation of one view, board frame to camera frame.
pub struct ViewPose {
    rotation: Rotation3<f64>,
    translation: Vector3<f64>,
}

impl ViewPose {
    pub fn from_params(pose: &[f64]) -> Self {
        Self {
            rotation: Rotation3::new(Vector3::new(pose[0], pose[1], pose[2])),
            translation: Vector3::new(pose[3], pose[4], pose[5]),
        }
    }

    /// Pixel position of a board-plane point (`z = 0`).
    pub fn project(&self, intrinsics: &[f64], board: Point2<f64>) -> Point2<f64> {
        let pc = self.rotation * Vector3::new(board.x, board.y, 0.0) + self.translation;
        let (xd, yd) = distort(pc.x / pc.z, pc.y / pc.z, &intrinsics[4..INTRINSIC_PARAMS]);
        Point2::new(
            intrinsics[0] * xd + intrinsics[2],
            intrinsics[1] * yd + intrinsics[3],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_distortion_is_identity() {
        let (x, y) = distort(0.3, -0.2, &[0.0; 5]);
        assert_relative_eq!(x, 0.3);
        assert_relative_eq!(y, -0.2);
    }

    #[test]
    fn barrel_distortion_pulls_points_inward() {
        let (x, y) = distort(0.4, 0.3, &[-0.2, 0.0, 0.0, 0.0, 0.0]);
        assert!(x < 0.4 && y < 0.3);
        assert_relative_eq!(x / y, 0.4 / 0.3, epsilon = 1e-12);
    }

    #[test]
    fn fronto_parallel_projection() {
        let intr = [500.0, 500.0, 320.0, 240.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let pose = ViewPose::from_params(&[0.0, 0.0, 0.0, -0.1, -0.1, 1.0]);
        let p = pose.project(&intr, Point2::new(0.1, 0.1));
        assert_relative_eq!(p.x, 320.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 240.0, epsilon = 1e-9);
        let q = pose.project(&intr, Point2::new(0.2, 0.1));
        assert_relative_eq!(q.x, 370.0, epsilon = 1e-9);
    }
}
