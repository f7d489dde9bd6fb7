use crate::detection::Detection;
use crate::source::Frame;

/// Locates the calibration board in a frame.
///
/// Stateless per call apart from the board configuration it was built with.
pub trait BoardDetector {
    /// Detect corners and markers. Never fails: a missing board yields
    /// [`Detection::empty`].
    fn detect(&self, frame: &Frame) -> Detection;

    /// Return a copy of `frame` with the detection drawn on it.
    fn render(&self, frame: &Frame, detection: &Detection) -> Frame;
}

impl<D: BoardDetector + ?Sized> BoardDetector for &D {
    fn detect(&self, frame: &Frame) -> Detection {
        (**self).detect(frame)
    }

    fn render(&self, frame: &Frame, detection: &Detection) -> Frame {
        (**self).render(frame, detection)
    }
}
