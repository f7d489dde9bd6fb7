//! ChArUco collaborators for camcal.
//!
//! - [`CharucoBoardDetector`]: a [`camcal_core::BoardDetector`] running the
//!   `calib-targets` ChArUco pipeline on each frame.
//! - [`draw_detection`]: preview annotation (corners blue, markers red).
//! - [`BoardRenderer`]: printable board images.
//!
//! ```no_run
//! use camcal_charuco::BoardRenderer;
//! use camcal_core::BoardConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = BoardRenderer.generate_image(&BoardConfig::default(), 0, 0)?;
//! img.save("ChArUco_img.png")?;
//! # Ok(())
//! # }
//! ```

mod board_image;
mod detector;
mod render;

pub use board_image::{BoardRenderer, DEFAULT_PX_PER_SQUARE};
pub use detector::{board_dictionary, board_to_image, marker_outline, CharucoBoardDetector};
pub use render::{draw_detection, Overlay};
