//! Interactive capture-and-calibrate session.
//!
//! The session owns a one-shot capture latch and an append-only dataset.
//! Arming the latch makes the *next* processed frame count: that frame always
//! consumes the latch, records its size, and contributes a sample only when
//! enough markers were identified on it.

use crate::calibrator::Calibrator;
use crate::dataset::CalibrationDataset;
use crate::detection::CalibrationSample;
use crate::detector::BoardDetector;
use crate::report::Reporter;
use crate::source::{frame_resolution, Frame};
use crate::Resolution;
use serde::{Deserialize, Serialize};
use std::io;

/// Control signal returned by every session operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Stop the driving loop.
    Stop,
    /// Nothing actionable right now.
    Declined,
    /// The action was carried out.
    Done,
}

impl Signal {
    #[inline]
    pub fn as_i32(self) -> i32 {
        match self {
            Signal::Stop => -1,
            Signal::Declined => 0,
            Signal::Done => 1,
        }
    }

    #[inline]
    pub fn is_stop(self) -> bool {
        self.as_i32() < 0
    }
}

impl From<Signal> for i32 {
    fn from(signal: Signal) -> Self {
        signal.as_i32()
    }
}

/// Gating thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionParams {
    /// Markers an armed frame must show to be accepted as a sample.
    pub min_markers: usize,
    /// Samples required before a solve is attempted.
    pub min_samples: usize,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            min_markers: 4,
            min_samples: 5,
        }
    }
}

/// Capture latch plus accumulated calibration data.
pub struct CalibrationSession<K: Calibrator, R: Reporter> {
    params: SessionParams,
    calibrator: K,
    reporter: R,
    dataset: CalibrationDataset,
    latch_armed: bool,
}

impl<K: Calibrator, R: Reporter> CalibrationSession<K, R> {
    pub fn new(calibrator: K, reporter: R) -> Self {
        Self::with_params(calibrator, reporter, SessionParams::default())
    }

    pub fn with_params(calibrator: K, reporter: R, params: SessionParams) -> Self {
        Self {
            params,
            calibrator,
            reporter,
            dataset: CalibrationDataset::new(),
            latch_armed: false,
        }
    }

    #[inline]
    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.latch_armed
    }

    #[inline]
    pub fn dataset(&self) -> &CalibrationDataset {
        &self.dataset
    }

    #[inline]
    pub fn sample_count(&self) -> usize {
        self.dataset.len()
    }

    #[inline]
    pub fn resolution(&self) -> Option<Resolution> {
        self.dataset.resolution()
    }

    #[inline]
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn into_parts(self) -> (CalibrationDataset, K, R) {
        (self.dataset, self.calibrator, self.reporter)
    }

    /// Detect the board in `frame` and return an annotated copy.
    ///
    /// When the latch is armed it is consumed here, whether or not the
    /// detection qualifies. The recorded resolution is overwritten with this
    /// frame's size even if no sample is appended.
    pub fn process_frame<D>(&mut self, detector: &D, frame: &Frame) -> io::Result<Frame>
    where
        D: BoardDetector + ?Sized,
    {
        let detection = detector.detect(frame);
        let annotated = detector.render(frame, &detection);

        if !self.latch_armed {
            return Ok(annotated);
        }
        self.latch_armed = false;

        let resolution = frame_resolution(frame);
        let previous = self.dataset.record_resolution(resolution);
        if let Some(prev) = previous {
            if prev != resolution && !self.dataset.is_empty() {
                log::warn!(
                    "frame size changed from {prev} to {resolution}; mixed-resolution samples are not supported"
                );
            }
        }

        let markers = detection.marker_count();
        if markers >= self.params.min_markers {
            self.dataset.push(CalibrationSample::from_detection(&detection));
            log::info!(
                "captured sample {} ({} corners, {} markers)",
                self.dataset.len(),
                detection.corner_count(),
                markers
            );
        } else {
            log::debug!(
                "armed frame dropped: {markers} markers < {}",
                self.params.min_markers
            );
        }

        self.reporter.capture(self.dataset.len(), resolution)?;
        Ok(annotated)
    }

    /// Arm the latch so the next processed frame is captured.
    pub fn request_capture(&mut self) -> Signal {
        if !self.latch_armed {
            log::debug!("capture latch armed");
        }
        self.latch_armed = true;
        Signal::Done
    }

    /// Solve over every accumulated sample. The dataset is left untouched.
    pub fn calibrate(&mut self) -> io::Result<Signal> {
        let count = self.dataset.len();
        let resolution = match self.dataset.resolution() {
            Some(res) if count >= self.params.min_samples => res,
            _ => {
                log::debug!(
                    "calibration declined: {count} samples, {} needed",
                    self.params.min_samples
                );
                self.reporter
                    .insufficient_data(count, self.params.min_samples)?;
                return Ok(Signal::Declined);
            }
        };

        log::info!("calibrating from {count} samples at {resolution}");
        match self.calibrator.solve(self.dataset.samples(), resolution) {
            Ok(result) => {
                log::info!("calibration rms = {:.4} px", result.rms);
                self.reporter.calibrated(resolution, count, &result)?;
                Ok(Signal::Done)
            }
            Err(err) => {
                log::warn!("calibration failed: {err}");
                self.reporter.solve_failed(&err)?;
                Ok(Signal::Declined)
            }
        }
    }

    /// Ask the driving loop to stop.
    pub fn request_exit(&self) -> Signal {
        Signal::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_values_match_loop_contract() {
        assert_eq!(i32::from(Signal::Stop), -1);
        assert_eq!(i32::from(Signal::Declined), 0);
        assert_eq!(i32::from(Signal::Done), 1);
        assert!(Signal::Stop.is_stop());
        assert!(!Signal::Declined.is_stop());
        assert!(!Signal::Done.is_stop());
    }

    #[test]
    fn default_thresholds() {
        let p = SessionParams::default();
        assert_eq!(p.min_markers, 4);
        assert_eq!(p.min_samples, 5);
    }
}
