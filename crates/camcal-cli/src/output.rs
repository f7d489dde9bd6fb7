use camcal_core::{CalibrationReport, CalibrationResult, Reporter, Resolution, SolveError};
use std::io;
use std::path::PathBuf;

/// Forwards to `inner` and additionally writes every successful calibration
/// to a JSON file (the latest result wins). A failed write is logged and
/// does not end the session.
pub struct JsonResultWriter<R> {
    inner: R,
    path: PathBuf,
}

impl<R: Reporter> JsonResultWriter<R> {
    pub fn new(inner: R, path: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            path: path.into(),
        }
    }
}

impl<R: Reporter> Reporter for JsonResultWriter<R> {
    fn capture(&mut self, count: usize, resolution: Resolution) -> io::Result<()> {
        self.inner.capture(count, resolution)
    }

    fn insufficient_data(&mut self, count: usize, needed: usize) -> io::Result<()> {
        self.inner.insufficient_data(count, needed)
    }

    fn calibrated(
        &mut self,
        resolution: Resolution,
        samples: usize,
        result: &CalibrationResult,
    ) -> io::Result<()> {
        self.inner.calibrated(resolution, samples, result)?;
        let report = CalibrationReport {
            resolution,
            samples,
            result: result.clone(),
        };
        match report.write_json(&self.path) {
            Ok(()) => log::info!("calibration written to {}", self.path.display()),
            Err(err) => log::warn!(
                "could not write calibration to {}: {err}",
                self.path.display()
            ),
        }
        Ok(())
    }

    fn solve_failed(&mut self, error: &SolveError) -> io::Result<()> {
        self.inner.solve_failed(error)
    }
}
