//! Zhang's closed-form intrinsics from plane homographies, zero skew.

use camcal_core::{Resolution, SolveError};
use nalgebra::{DMatrix, Matrix3, SVector};

/// `v_ij` row of Zhang's constraint matrix, skew column dropped.
///
/// Unknowns are `[B11, B22, B13, B23, B33]`; `B12 = 0` under zero skew.
fn v_ij(h: &Matrix3<f64>, i: usize, j: usize) -> SVector<f64, 5> {
    let hi = h.column(i);
    let hj = h.column(j);
    SVector::<f64, 5>::from_row_slice(&[
        hi[0] * hj[0],
        hi[1] * hj[1],
        hi[2] * hj[0] + hi[0] * hj[2],
        hi[2] * hj[1] + hi[1] * hj[2],
        hi[2] * hj[2],
    ])
}

/// Pixel-to-unit-square conditioning: centre at the image middle, scale by
/// half the longer side. Keeps zero skew invariant.
fn conditioning(resolution: Resolution) -> Matrix3<f64> {
    let w = resolution.width.max(1) as f64;
    let h = resolution.height.max(1) as f64;
    let s = 2.0 / w.max(h);
    Matrix3::new(s, 0.0, -s * w / 2.0, 0.0, s, -s * h / 2.0, 0.0, 0.0, 1.0)
}

/// Estimate `K` (zero skew) from at least 3 board-to-image homographies.
pub fn estimate_intrinsics(
    homographies: &[Matrix3<f64>],
    resolution: Resolution,
) -> Result<Matrix3<f64>, SolveError> {
    if homographies.len() < 3 {
        return Err(SolveError::NotEnoughViews {
            needed: 3,
            got: homographies.len(),
        });
    }

    let t = conditioning(resolution);
    let t_inv = t
        .try_inverse()
        .ok_or(SolveError::Degenerate("image size"))?;

    let m = homographies.len();
    let mut v = DMatrix::<f64>::zeros(2 * m, 5);
    for (k, h) in homographies.iter().enumerate() {
        let hn = t * h;
        let norm = hn.norm();
        if !norm.is_finite() || norm < 1e-12 {
            return Err(SolveError::Degenerate("zero homography"));
        }
        let hn = hn / norm;
        let v11 = v_ij(&hn, 0, 0);
        let v22 = v_ij(&hn, 1, 1);
        let v12 = v_ij(&hn, 0, 1);
        v.row_mut(2 * k).copy_from(&v12.transpose());
        v.row_mut(2 * k + 1).copy_from(&(v11 - v22).transpose());
    }

    let svd = v.svd(false, true);
    let vt = svd
        .v_t
        .ok_or(SolveError::Degenerate("svd of the constraint matrix"))?;
    let (idx, _) = svd
        .singular_values
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .ok_or(SolveError::Degenerate("empty constraint matrix"))?;
    let b = vt.row(idx);

    // A one-dimensional null space is needed; views that all share the same
    // tilt leave it wider.
    let mut sv: Vec<f64> = svd.singular_values.iter().copied().collect();
    sv.sort_by(|a, b| a.total_cmp(b));
    let largest = sv.last().copied().unwrap_or(0.0);
    if sv.len() < 2 || sv[1] <= 1e-9 * largest {
        return Err(SolveError::Degenerate("views do not constrain the intrinsics"));
    }

    // B is defined up to sign; fix B11 > 0.
    let sign = if b[0] < 0.0 { -1.0 } else { 1.0 };
    let (b11, b22, b13, b23, b33) = (
        sign * b[0],
        sign * b[1],
        sign * b[2],
        sign * b[3],
        sign * b[4],
    );
    if b11 <= 1e-12 || b22 <= 1e-12 {
        return Err(SolveError::Degenerate("image of the absolute conic"));
    }

    let v0 = -b23 / b22;
    let lambda = b33 - (b13 * b13 - v0 * b11 * b23) / b11;
    if lambda <= 0.0 || !lambda.is_finite() {
        return Err(SolveError::Degenerate("image of the absolute conic"));
    }

    let alpha = (lambda / b11).sqrt();
    let beta = (lambda / b22).sqrt();
    let u0 = -b13 * alpha * alpha / lambda;

    let kn = Matrix3::new(alpha, 0.0, u0, 0.0, beta, v0, 0.0, 0.0, 1.0);
    let k = t_inv * kn;
    if !k.iter().all(|x| x.is_finite()) {
        return Err(SolveError::Degenerate("non-finite intrinsics"));
    }
    Ok(k)
}
