//! Reprojection error over all views, shared camera.

use crate::model::{ViewPose, INTRINSIC_PARAMS, POSE_PARAMS};
use levenberg_marquardt::LeastSquaresProblem;
use lm_nalgebra::{storage::Owned, DMatrix, DVector, Dyn};
use nalgebra::Point2;

/// Board-plane points and their observed pixels for one view.
#[derive(Clone, Debug)]
pub struct PlanarView {
    pub board: Vec<Point2<f64>>,
    pub pixels: Vec<Point2<f64>>,
}

impl PlanarView {
    pub fn len(&self) -> usize {
        self.board.len()
    }

    pub fn is_empty(&self) -> bool {
        self.board.is_empty()
    }
}

/// Reprojection residuals of every view under one shared camera, as a
/// `levenberg-marquardt` problem over the solver parameter vector.
pub struct ReprojectionProblem<'a> {
    views: &'a [PlanarView],
    /// First residual row of each view.
    offsets: Vec<usize>,
    residual_count: usize,
    params: DVector<f64>,
}

impl<'a> ReprojectionProblem<'a> {
    /// `x0` holds the camera parameters followed by one pose per view.
    pub fn new(views: &'a [PlanarView], x0: &[f64]) -> Self {
        let mut offsets = Vec::with_capacity(views.len());
        let mut rows = 0;
        for view in views {
            offsets.push(rows);
            rows += 2 * view.len();
        }
        debug_assert_eq!(x0.len(), INTRINSIC_PARAMS + POSE_PARAMS * views.len());
        Self {
            views,
            offsets,
            residual_count: rows,
            params: DVector::from_column_slice(x0),
        }
    }

    pub fn param_count(&self) -> usize {
        INTRINSIC_PARAMS + POSE_PARAMS * self.views.len()
    }

    pub fn point_count(&self) -> usize {
        self.residual_count / 2
    }

    /// Current parameter vector.
    pub fn x(&self) -> &[f64] {
        self.params.as_slice()
    }

    /// Root mean square pixel error per observed corner.
    pub fn rms(&self) -> f64 {
        let cost: f64 = self.residual_vec().iter().map(|r| r * r).sum();
        (cost / self.point_count().max(1) as f64).sqrt()
    }

    fn pose_range(v: usize) -> std::ops::Range<usize> {
        let start = INTRINSIC_PARAMS + POSE_PARAMS * v;
        start..start + POSE_PARAMS
    }

    fn view_residuals(&self, intrinsics: &[f64], pose: &[f64], v: usize, out: &mut [f64]) {
        let view = &self.views[v];
        let pose = ViewPose::from_params(pose);
        for (k, (b, p)) in view.board.iter().zip(&view.pixels).enumerate() {
            let q = pose.project(intrinsics, *b);
            out[2 * k] = q.x - p.x;
            out[2 * k + 1] = q.y - p.y;
        }
    }

    fn residual_vec(&self) -> DVector<f64> {
        let params = self.params.as_slice();
        let mut r = DVector::zeros(self.residual_count);
        let out = r.as_mut_slice();
        for v in 0..self.views.len() {
            let start = self.offsets[v];
            let end = start + 2 * self.views[v].len();
            self.view_residuals(
                &params[..INTRINSIC_PARAMS],
                &params[Self::pose_range(v)],
                v,
                &mut out[start..end],
            );
        }
        r
    }

    /// Central differences, one view block at a time: a view's rows only
    /// depend on the camera and on that view's pose.
    fn jacobian_mat(&self) -> DMatrix<f64> {
        let x = self.params.as_slice();
        let mut j = DMatrix::zeros(self.residual_count, self.param_count());
        let mut intrinsics = [0.0; INTRINSIC_PARAMS];
        intrinsics.copy_from_slice(&x[..INTRINSIC_PARAMS]);

        for v in 0..self.views.len() {
            let rows = 2 * self.views[v].len();
            let row0 = self.offsets[v];
            let range = Self::pose_range(v);
            let mut pose = [0.0; POSE_PARAMS];
            pose.copy_from_slice(&x[range.clone()]);

            let mut plus = vec![0.0; rows];
            let mut minus = vec![0.0; rows];

            for c in 0..INTRINSIC_PARAMS {
                let h = step_for(intrinsics[c]);
                let saved = intrinsics[c];
                intrinsics[c] = saved + h;
                self.view_residuals(&intrinsics, &pose, v, &mut plus);
                intrinsics[c] = saved - h;
                self.view_residuals(&intrinsics, &pose, v, &mut minus);
                intrinsics[c] = saved;
                for row in 0..rows {
                    j[(row0 + row, c)] = (plus[row] - minus[row]) / (2.0 * h);
                }
            }

            for c in 0..POSE_PARAMS {
                let h = step_for(pose[c]);
                let saved = pose[c];
                pose[c] = saved + h;
                self.view_residuals(&intrinsics, &pose, v, &mut plus);
                pose[c] = saved - h;
                self.view_residuals(&intrinsics, &pose, v, &mut minus);
                pose[c] = saved;
                for row in 0..rows {
                    j[(row0 + row, range.start + c)] = (plus[row] - minus[row]) / (2.0 * h);
                }
            }
        }
        j
    }
}

fn step_for(value: f64) -> f64 {
    1e-6 * value.abs().max(1.0)
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for ReprojectionProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.params.clone_from(x);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let r = self.residual_vec();
        r.iter().all(|v| v.is_finite()).then_some(r)
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let j = self.jacobian_mat();
        j.iter().all(|v| v.is_finite()).then_some(j)
    }
}
