use crate::dataset::Resolution;
use crate::detection::CalibrationSample;
use crate::result::CalibrationResult;

/// Calibration solve failures. Reported to the user; the loop continues.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("need at least {needed} views with 4+ corners, got {got}")]
    NotEnoughViews { needed: usize, got: usize },
    #[error("corner id {0} is not on the board")]
    UnknownCorner(u32),
    #[error("degenerate view geometry: {0}")]
    Degenerate(&'static str),
    #[error("calibration diverged")]
    Diverged,
}

/// Solves camera intrinsics from accumulated samples.
pub trait Calibrator {
    fn solve(
        &self,
        samples: &[CalibrationSample],
        resolution: Resolution,
    ) -> Result<CalibrationResult, SolveError>;
}

impl<C: Calibrator + ?Sized> Calibrator for Box<C> {
    fn solve(
        &self,
        samples: &[CalibrationSample],
        resolution: Resolution,
    ) -> Result<CalibrationResult, SolveError> {
        (**self).solve(samples, resolution)
    }
}
