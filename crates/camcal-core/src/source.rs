//! Frame acquisition.

use crate::dataset::Resolution;

/// Frames travel through the pipeline as packed RGB8.
pub type Frame = image::RgbImage;

/// Pixel size of a frame.
#[inline]
pub fn frame_resolution(frame: &Frame) -> Resolution {
    Resolution::new(frame.width(), frame.height())
}

/// Capture device failures. Fatal to the run.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("could not open capture device {0}")]
    Open(String),
    #[error("could not read a frame from {0}")]
    Read(String),
    #[error("no frames found in {0}")]
    Empty(String),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A device that produces frames on demand.
///
/// Opening is done by the concrete type's constructor. `release` must be
/// idempotent; [`SourceGuard`] calls it on every exit path.
pub trait FrameSource {
    /// Block until the next frame is available.
    fn read(&mut self) -> Result<Frame, SourceError>;

    /// Give the device back. Safe to call more than once.
    fn release(&mut self);
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn read(&mut self) -> Result<Frame, SourceError> {
        (**self).read()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Scoped ownership of a frame source: releases it when dropped.
pub struct SourceGuard<S: FrameSource> {
    source: S,
}

impl<S: FrameSource> SourceGuard<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    #[inline]
    pub fn read(&mut self) -> Result<Frame, SourceError> {
        self.source.read()
    }
}

impl<S: FrameSource> Drop for SourceGuard<S> {
    fn drop(&mut self) {
        log::debug!("releasing frame source");
        self.source.release();
    }
}
