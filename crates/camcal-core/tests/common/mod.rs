#![allow(dead_code)]

use camcal_core::{
    BoardDetector, CalibrationResult, CalibrationSample, Calibrator, Console, DetectedCorner,
    DetectedMarker, Detection, DisplayError, Frame, FrameSource, Reporter, Resolution,
    SolveError, SourceError,
};
use nalgebra::Point2;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

/// Detection with `markers` markers and `markers * 2` corners.
pub fn detection_with_markers(markers: usize) -> Detection {
    Detection {
        corners: (0..markers * 2)
            .map(|i| DetectedCorner {
                id: i as u32,
                position: Point2::new(10.0 * i as f32, 5.0 * i as f32),
            })
            .collect(),
        markers: (0..markers)
            .map(|i| DetectedMarker {
                id: i as u32,
                outline: None,
            })
            .collect(),
    }
}

pub fn frame(width: u32, height: u32) -> Frame {
    Frame::new(width, height)
}

/// Hands out queued detections in order, then empty ones.
#[derive(Default)]
pub struct ScriptedDetector {
    queue: RefCell<VecDeque<Detection>>,
    pub renders: Cell<usize>,
}

impl ScriptedDetector {
    pub fn new(markers: impl IntoIterator<Item = usize>) -> Self {
        Self {
            queue: RefCell::new(markers.into_iter().map(detection_with_markers).collect()),
            renders: Cell::new(0),
        }
    }

    pub fn push(&self, markers: usize) {
        self.queue
            .borrow_mut()
            .push_back(detection_with_markers(markers));
    }
}

impl BoardDetector for ScriptedDetector {
    fn detect(&self, _frame: &Frame) -> Detection {
        self.queue.borrow_mut().pop_front().unwrap_or_default()
    }

    fn render(&self, frame: &Frame, _detection: &Detection) -> Frame {
        self.renders.set(self.renders.get() + 1);
        frame.clone()
    }
}

/// Deterministic solver whose output depends only on the inputs.
#[derive(Default)]
pub struct FakeCalibrator {
    pub calls: Rc<Cell<usize>>,
    pub fail: bool,
}

impl FakeCalibrator {
    pub fn failing() -> Self {
        Self {
            calls: Rc::default(),
            fail: true,
        }
    }
}

impl Calibrator for FakeCalibrator {
    fn solve(
        &self,
        samples: &[CalibrationSample],
        resolution: Resolution,
    ) -> Result<CalibrationResult, SolveError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(SolveError::Degenerate("all views coplanar"));
        }
        let n = samples.len() as f64;
        Ok(CalibrationResult::new(
            100.0 * n,
            100.0 * n,
            resolution.width as f64 / 2.0,
            resolution.height as f64 / 2.0,
            [0.0; 5],
            1.0 / n,
        ))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Capture(usize, Resolution),
    Insufficient(usize, usize),
    Calibrated(Resolution, usize, CalibrationResult),
    SolveFailed(SolveError),
}

#[derive(Default)]
pub struct RecordingReporter {
    pub events: Vec<Event>,
}

impl Reporter for RecordingReporter {
    fn capture(&mut self, count: usize, resolution: Resolution) -> io::Result<()> {
        self.events.push(Event::Capture(count, resolution));
        Ok(())
    }

    fn insufficient_data(&mut self, count: usize, needed: usize) -> io::Result<()> {
        self.events.push(Event::Insufficient(count, needed));
        Ok(())
    }

    fn calibrated(
        &mut self,
        resolution: Resolution,
        samples: usize,
        result: &CalibrationResult,
    ) -> io::Result<()> {
        self.events
            .push(Event::Calibrated(resolution, samples, result.clone()));
        Ok(())
    }

    fn solve_failed(&mut self, error: &SolveError) -> io::Result<()> {
        self.events.push(Event::SolveFailed(error.clone()));
        Ok(())
    }
}

/// Produces blank frames; optionally fails after `limit` reads.
pub struct FakeSource {
    pub width: u32,
    pub height: u32,
    pub limit: Option<usize>,
    pub reads: usize,
    pub releases: Rc<Cell<usize>>,
}

impl FakeSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            limit: None,
            reads: 0,
            releases: Rc::default(),
        }
    }

    pub fn failing_after(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl FrameSource for FakeSource {
    fn read(&mut self) -> Result<Frame, SourceError> {
        if self.limit.is_some_and(|limit| self.reads >= limit) {
            return Err(SourceError::Read("fake device".to_string()));
        }
        self.reads += 1;
        Ok(frame(self.width, self.height))
    }

    fn release(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}

/// One key per frame from a script; `.` is "no key". Runs dry as `q`.
pub struct ScriptedConsole {
    keys: VecDeque<char>,
    pub shown: usize,
    pub fail_show: bool,
}

impl ScriptedConsole {
    pub fn new(script: &str) -> Self {
        Self {
            keys: script.chars().collect(),
            shown: 0,
            fail_show: false,
        }
    }
}

impl Console for ScriptedConsole {
    fn show(&mut self, _frame: &Frame) -> Result<(), DisplayError> {
        if self.fail_show {
            return Err(DisplayError::Backend("window closed".to_string()));
        }
        self.shown += 1;
        Ok(())
    }

    fn poll_key(&mut self) -> Result<Option<char>, DisplayError> {
        Ok(match self.keys.pop_front() {
            Some('.') => None,
            Some(k) => Some(k),
            None => Some('q'),
        })
    }
}
