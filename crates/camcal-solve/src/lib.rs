//! Planar camera calibration for camcal.
//!
//! [`PlanarCalibrator`] implements [`camcal_core::Calibrator`]:
//!
//! 1. per-view homography (`calib-targets` normalized DLT) from ChArUco
//!    corner ids,
//! 2. Zhang's closed-form intrinsics with zero skew,
//! 3. per-view pose from each homography,
//! 4. `levenberg-marquardt` refinement of the camera, its 5 Brown-Conrady
//!    coefficients and every pose against the observed pixels.

mod intrinsics;
mod model;
mod pose;
mod reprojection;

pub use intrinsics::estimate_intrinsics;
pub use model::distort;
pub use pose::pose_from_homography;
pub use reprojection::{PlanarView, ReprojectionProblem};

use calib_targets::core::estimate_homography_rect_to_img;
use camcal_core::{
    BoardConfig, CalibrationResult, CalibrationSample, Calibrator, Resolution, SolveError,
};
use levenberg_marquardt::LevenbergMarquardt;
use model::{INTRINSIC_PARAMS, POSE_PARAMS};
use nalgebra::{Matrix3, Point2};

/// Tunables for [`PlanarCalibrator`].
#[derive(Clone, Copy, Debug)]
pub struct SolveOptions {
    /// Views with fewer corners are skipped.
    pub min_corners: usize,
    /// Usable views required for a solve.
    pub min_views: usize,
    /// Relative cost reduction tolerance of the refinement.
    pub ftol: f64,
    /// Relative parameter change tolerance of the refinement.
    pub xtol: f64,
    pub gtol: f64,
    /// Evaluation budget, in multiples of `(parameters + 1)`.
    pub patience: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            min_corners: 4,
            min_views: 3,
            ftol: 1e-12,
            xtol: 1e-12,
            gtol: 1e-12,
            patience: 100,
        }
    }
}

/// Calibrates a pinhole camera with Brown-Conrady distortion from views of a
/// known ChArUco board.
#[derive(Clone, Debug)]
pub struct PlanarCalibrator {
    board: BoardConfig,
    options: SolveOptions,
}

impl PlanarCalibrator {
    pub fn new(board: BoardConfig) -> Self {
        Self::with_options(board, SolveOptions::default())
    }

    pub fn with_options(board: BoardConfig, options: SolveOptions) -> Self {
        Self { board, options }
    }

    pub fn board(&self) -> &BoardConfig {
        &self.board
    }

    fn planar_view(&self, sample: &CalibrationSample) -> Result<PlanarView, SolveError> {
        let mut board = Vec::with_capacity(sample.len());
        let mut pixels = Vec::with_capacity(sample.len());
        for (id, p) in sample.iter() {
            let b = self
                .board
                .corner_position(id)
                .ok_or(SolveError::UnknownCorner(id))?;
            board.push(b);
            pixels.push(Point2::new(p.x as f64, p.y as f64));
        }
        Ok(PlanarView { board, pixels })
    }
}

/// `true` when the points (nearly) lie on one line.
fn is_collinear(points: &[Point2<f64>]) -> bool {
    let n = points.len() as f64;
    let (mx, my) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x / n, sy + p.y / n));
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for p in points {
        let (dx, dy) = (p.x - mx, p.y - my);
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    let half_trace = 0.5 * (sxx + syy);
    let spread = (0.25 * (sxx - syy).powi(2) + sxy * sxy).sqrt();
    let (lo, hi) = (half_trace - spread, half_trace + spread);
    hi <= 0.0 || lo <= 1e-6 * hi
}

impl Calibrator for PlanarCalibrator {
    fn solve(
        &self,
        samples: &[CalibrationSample],
        resolution: Resolution,
    ) -> Result<CalibrationResult, SolveError> {
        let mut views = Vec::with_capacity(samples.len());
        let mut homographies: Vec<Matrix3<f64>> = Vec::with_capacity(samples.len());

        for (i, sample) in samples.iter().enumerate() {
            let view = self.planar_view(sample)?;
            if view.len() < self.options.min_corners.max(4) {
                log::debug!("view {i}: {} corners, skipped", view.len());
                continue;
            }
            if is_collinear(&view.board) {
                log::debug!("view {i}: corners are collinear, skipped");
                continue;
            }
            match estimate_homography_rect_to_img(&view.board, &view.pixels) {
                Some(h) => {
                    homographies.push(h.h);
                    views.push(view);
                }
                None => log::debug!("view {i}: homography fit failed, skipped"),
            }
        }

        let needed = self.options.min_views.max(3);
        if views.len() < needed {
            return Err(SolveError::NotEnoughViews {
                needed,
                got: views.len(),
            });
        }

        let k = estimate_intrinsics(&homographies, resolution)?;
        log::debug!(
            "zhang init: fx={:.2} fy={:.2} cx={:.2} cy={:.2}",
            k[(0, 0)],
            k[(1, 1)],
            k[(0, 2)],
            k[(1, 2)]
        );

        let mut x0 = vec![0.0; INTRINSIC_PARAMS + POSE_PARAMS * views.len()];
        x0[..4].copy_from_slice(&[k[(0, 0)], k[(1, 1)], k[(0, 2)], k[(1, 2)]]);
        for (v, h) in homographies.iter().enumerate() {
            let (rotation, translation) = pose_from_homography(&k, h)
                .ok_or(SolveError::Degenerate("homography does not decompose into a pose"))?;
            let base = INTRINSIC_PARAMS + POSE_PARAMS * v;
            x0[base..base + 3].copy_from_slice(rotation.as_slice());
            x0[base + 3..base + 6].copy_from_slice(translation.as_slice());
        }

        let problem = ReprojectionProblem::new(&views, &x0);
        log::debug!("refining {} views, initial rms {:.4}", views.len(), problem.rms());
        let (problem, report) = LevenbergMarquardt::new()
            .with_ftol(self.options.ftol)
            .with_xtol(self.options.xtol)
            .with_gtol(self.options.gtol)
            .with_patience(self.options.patience.max(1))
            .minimize(problem);
        if !report.termination.was_successful() {
            log::warn!(
                "refinement stopped after {} evaluations: {:?}",
                report.number_of_evaluations,
                report.termination
            );
        }

        let x = problem.x();
        let rms = problem.rms();
        let result = CalibrationResult::new(
            x[0],
            x[1],
            x[2],
            x[3],
            [x[4], x[5], x[6], x[7], x[8]],
            rms,
        );
        if !result.is_finite() || result.fx() <= 0.0 || result.fy() <= 0.0 {
            return Err(SolveError::Diverged);
        }
        Ok(result)
    }
}
