//! Core of the ChArUco camera calibration assistant.
//!
//! This crate holds the capture-and-calibrate workflow and the data it works
//! on. It does *not* depend on any concrete camera, detector or solver: those
//! are reached through the [`FrameSource`], [`BoardDetector`], [`Calibrator`],
//! [`Reporter`] and [`Console`] traits.
//!
//! ## Workflow
//!
//! ```no_run
//! use camcal_core::{run_loop, CalibrationSession, KeyMap, TextReporter};
//! # fn demo<K, S, D, C>(calibrator: K, source: S, detector: &D, console: &mut C)
//! # -> Result<(), camcal_core::RunError>
//! # where K: camcal_core::Calibrator, S: camcal_core::FrameSource,
//! #       D: camcal_core::BoardDetector, C: camcal_core::Console {
//! let mut session = CalibrationSession::new(calibrator, TextReporter::stdout());
//! let summary = run_loop(&mut session, source, detector, console, &KeyMap::default())?;
//! println!("{} samples", summary.samples);
//! # Ok(())
//! # }
//! ```

mod board;
mod calibrator;
mod command;
mod console;
mod dataset;
mod detection;
mod detector;
mod logger;
mod report;
mod result;
mod run;
mod session;
mod source;

pub use board::{BoardConfig, ConfigError, JsonIoError, DEFAULT_DICTIONARY, INCH};
pub use calibrator::{Calibrator, SolveError};
pub use command::{dispatch, Command, KeyMap, DEFAULT_BINDINGS};
pub use console::{Console, DisplayError};
pub use dataset::{CalibrationDataset, Resolution};
pub use detection::{CalibrationSample, DetectedCorner, DetectedMarker, Detection};
pub use detector::BoardDetector;
pub use report::{Reporter, TextReporter};
pub use result::{CalibrationReport, CalibrationResult, DistortionCoeffs};
pub use run::{run_loop, RunError, RunSummary};
pub use session::{CalibrationSession, SessionParams, Signal};
pub use source::{frame_resolution, Frame, FrameSource, SourceError, SourceGuard};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
