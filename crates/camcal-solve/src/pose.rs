use nalgebra::{Matrix3, Rotation3, Vector3};

/// Initial board pose from a plane homography and intrinsics.
///
/// `H ~ K [r1 r2 t]`; the rotation is projected onto SO(3) and the scale is
/// chosen so the board lies in front of the camera. Returns
/// `(axis_angle, translation)`.
pub fn pose_from_homography(
    k: &Matrix3<f64>,
    h: &Matrix3<f64>,
) -> Option<(Vector3<f64>, Vector3<f64>)> {
    let k_inv = k.try_inverse()?;
    let a1 = k_inv * h.column(0);
    let a2 = k_inv * h.column(1);
    let a3 = k_inv * h.column(2);

    let mean_norm = 0.5 * (a1.norm() + a2.norm());
    if !mean_norm.is_finite() || mean_norm < 1e-12 {
        return None;
    }
    let mut lambda = 1.0 / mean_norm;
    if a3.z < 0.0 {
        lambda = -lambda;
    }

    let r1 = a1 * lambda;
    let r2 = a2 * lambda;
    let r3 = r1.cross(&r2);
    let approx = Matrix3::from_columns(&[r1, r2, r3]);

    let svd = approx.svd(true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;
    let mut r = u * v_t;
    if r.determinant() < 0.0 {
        let mut u_flipped = u;
        u_flipped.column_mut(2).neg_mut();
        r = u_flipped * v_t;
    }

    let rotation = Rotation3::from_matrix_unchecked(r);
    Some((rotation.scaled_axis(), a3 * lambda))
}
