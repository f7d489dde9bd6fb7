//! User-facing output of the capture session.

use crate::calibrator::SolveError;
use crate::dataset::Resolution;
use crate::result::CalibrationResult;
use std::io::{self, Write};

/// Receives every user-visible outcome of the session.
pub trait Reporter {
    /// An armed frame was consumed. `count` is the sample count afterwards.
    fn capture(&mut self, count: usize, resolution: Resolution) -> io::Result<()>;

    /// Calibration was requested without enough data.
    fn insufficient_data(&mut self, count: usize, needed: usize) -> io::Result<()>;

    /// Calibration succeeded.
    fn calibrated(
        &mut self,
        resolution: Resolution,
        samples: usize,
        result: &CalibrationResult,
    ) -> io::Result<()>;

    /// The solver rejected the data.
    fn solve_failed(&mut self, error: &SolveError) -> io::Result<()>;
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn capture(&mut self, count: usize, resolution: Resolution) -> io::Result<()> {
        (**self).capture(count, resolution)
    }

    fn insufficient_data(&mut self, count: usize, needed: usize) -> io::Result<()> {
        (**self).insufficient_data(count, needed)
    }

    fn calibrated(
        &mut self,
        resolution: Resolution,
        samples: usize,
        result: &CalibrationResult,
    ) -> io::Result<()> {
        (**self).calibrated(resolution, samples, result)
    }

    fn solve_failed(&mut self, error: &SolveError) -> io::Result<()> {
        (**self).solve_failed(error)
    }
}

/// Plain-text reporter. The calibration block is formatted so it can be
/// pasted into a Python settings file.
pub struct TextReporter<W: Write> {
    out: W,
}

impl TextReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn capture(&mut self, count: usize, resolution: Resolution) -> io::Result<()> {
        writeln!(self.out, "capture: {count}, {resolution}")?;
        self.out.flush()
    }

    fn insufficient_data(&mut self, _count: usize, _needed: usize) -> io::Result<()> {
        writeln!(self.out, "Not enough data to generate calibration data.")?;
        self.out.flush()
    }

    fn calibrated(
        &mut self,
        resolution: Resolution,
        _samples: usize,
        result: &CalibrationResult,
    ) -> io::Result<()> {
        let [k1, k2, p1, p2, k3] = result.dist_coeffs;
        writeln!(self.out, "#''' Camera settings:")?;
        writeln!(self.out, "resolution = {resolution}")?;
        writeln!(
            self.out,
            "camera_params = ({}, {}, {}, {})",
            result.fx(),
            result.fy(),
            result.cx(),
            result.cy()
        )?;
        writeln!(self.out, "dist_coeffs = ({k1}, {k2}, {p1}, {p2}, {k3})")?;
        writeln!(self.out, "#Reprojection Error = {}", result.rms)?;
        writeln!(self.out, "#'''")?;
        self.out.flush()
    }

    fn solve_failed(&mut self, error: &SolveError) -> io::Result<()> {
        writeln!(self.out, "Calibration failed: {error}")?;
        self.out.flush()
    }
}
