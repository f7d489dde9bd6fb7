//! The polling loop that drives a [`CalibrationSession`].

use crate::calibrator::Calibrator;
use crate::command::{dispatch, KeyMap};
use crate::console::{Console, DisplayError};
use crate::detector::BoardDetector;
use crate::report::Reporter;
use crate::session::CalibrationSession;
use crate::source::{FrameSource, SourceError, SourceGuard};

/// Anything that ends a run early.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Display(#[from] DisplayError),
    #[error("report output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Counters for a finished run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub samples: usize,
}

/// Drive the session until a command returns a stop signal.
///
/// Each iteration reads a frame, processes it, shows the annotated copy,
/// polls one key and dispatches it. An exit key therefore takes effect only
/// after the current frame has been processed and shown. The source is
/// released on every exit path.
pub fn run_loop<K, R, S, D, C>(
    session: &mut CalibrationSession<K, R>,
    source: S,
    detector: &D,
    console: &mut C,
    keys: &KeyMap,
) -> Result<RunSummary, RunError>
where
    K: Calibrator,
    R: Reporter,
    S: FrameSource,
    D: BoardDetector + ?Sized,
    C: Console + ?Sized,
{
    let mut source = SourceGuard::new(source);
    let mut summary = RunSummary::default();

    loop {
        let frame = source.read()?;
        summary.frames += 1;

        let annotated = session.process_frame(detector, &frame)?;
        console.show(&annotated)?;

        let key = console.poll_key()?;
        let command = keys.command_for(key);
        let signal = dispatch(command, session)?;
        if let Some(k) = key {
            log::trace!("key {k:?} -> {command:?} -> {}", signal.as_i32());
        }
        if signal.is_stop() {
            break;
        }
    }

    summary.samples = session.sample_count();
    log::info!(
        "session finished after {} frames with {} samples",
        summary.frames,
        summary.samples
    );
    Ok(summary)
}
