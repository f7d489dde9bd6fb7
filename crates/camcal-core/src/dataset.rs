use crate::detection::CalibrationSample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Frame size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.width, self.height)
    }
}

/// Accepted samples plus the most recently recorded frame size.
///
/// Append-only: there is no removal operation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationDataset {
    samples: Vec<CalibrationSample>,
    resolution: Option<Resolution>,
}

impl CalibrationDataset {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn samples(&self) -> &[CalibrationSample] {
        &self.samples
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn resolution(&self) -> Option<Resolution> {
        self.resolution
    }

    /// Overwrite the recorded frame size, returning the previous value.
    pub(crate) fn record_resolution(&mut self, resolution: Resolution) -> Option<Resolution> {
        self.resolution.replace(resolution)
    }

    pub(crate) fn push(&mut self, sample: CalibrationSample) {
        self.samples.push(sample);
    }
}
