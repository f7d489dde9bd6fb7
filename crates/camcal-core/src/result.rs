use crate::board::JsonIoError;
use crate::dataset::Resolution;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Brown-Conrady coefficients in OpenCV order: `k1, k2, p1, p2, k3`.
pub type DistortionCoeffs = [f64; 5];

/// Output of a successful calibration solve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// RMS reprojection error in pixels.
    pub rms: f64,
    pub camera_matrix: Matrix3<f64>,
    pub dist_coeffs: DistortionCoeffs,
}

impl CalibrationResult {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64, dist_coeffs: DistortionCoeffs, rms: f64) -> Self {
        Self {
            rms,
            camera_matrix: Matrix3::new(fx, 0.0, cx, 0.0, fy, cy, 0.0, 0.0, 1.0),
            dist_coeffs,
        }
    }

    #[inline]
    pub fn fx(&self) -> f64 {
        self.camera_matrix[(0, 0)]
    }

    #[inline]
    pub fn fy(&self) -> f64 {
        self.camera_matrix[(1, 1)]
    }

    #[inline]
    pub fn cx(&self) -> f64 {
        self.camera_matrix[(0, 2)]
    }

    #[inline]
    pub fn cy(&self) -> f64 {
        self.camera_matrix[(1, 2)]
    }

    /// `true` when every number in the result is finite.
    pub fn is_finite(&self) -> bool {
        self.rms.is_finite()
            && self.camera_matrix.iter().all(|v| v.is_finite())
            && self.dist_coeffs.iter().all(|v| v.is_finite())
    }
}

/// A result together with the frame size it was solved for.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub resolution: Resolution,
    pub samples: usize,
    pub result: CalibrationResult,
}

impl CalibrationReport {
    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, JsonIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), JsonIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
