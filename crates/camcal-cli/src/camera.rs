//! OpenCV camera capture and preview window.

use camcal_core::{Console, DisplayError, Frame, FrameSource, SourceError};
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::{highgui, imgproc, videoio};

pub const WINDOW_TITLE: &str = "Calibration";

fn backend(err: opencv::Error) -> DisplayError {
    DisplayError::Backend(err.to_string())
}

/// A `VideoCapture` device.
pub struct CameraSource {
    name: String,
    capture: videoio::VideoCapture,
    released: bool,
}

impl CameraSource {
    pub fn open(device: i32, width: Option<u32>, height: Option<u32>) -> Result<Self, SourceError> {
        let name = format!("camera {device}");
        let open_err = |e: opencv::Error| SourceError::Open(format!("{name}: {e}"));

        let mut capture = videoio::VideoCapture::new(device, videoio::CAP_ANY).map_err(open_err)?;
        if !capture.is_opened().map_err(open_err)? {
            return Err(SourceError::Open(name));
        }
        if let Some(w) = width {
            capture
                .set(videoio::CAP_PROP_FRAME_WIDTH, w as f64)
                .map_err(open_err)?;
        }
        if let Some(h) = height {
            capture
                .set(videoio::CAP_PROP_FRAME_HEIGHT, h as f64)
                .map_err(open_err)?;
        }
        log::info!("opened {name}");
        Ok(Self {
            name,
            capture,
            released: false,
        })
    }
}

impl FrameSource for CameraSource {
    fn read(&mut self) -> Result<Frame, SourceError> {
        let read_err = |e: opencv::Error| SourceError::Read(format!("{}: {e}", self.name));

        let mut bgr = Mat::default();
        let ok = self.capture.read(&mut bgr).map_err(read_err)?;
        if !ok || bgr.empty() {
            return Err(SourceError::Read(self.name.clone()));
        }
        let mut rgb = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut rgb, imgproc::COLOR_BGR2RGB).map_err(read_err)?;

        let (w, h) = (rgb.cols() as u32, rgb.rows() as u32);
        let bytes = rgb.data_bytes().map_err(read_err)?.to_vec();
        Frame::from_raw(w, h, bytes).ok_or_else(|| SourceError::Read(self.name.clone()))
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(err) = self.capture.release() {
            log::warn!("failed to release {}: {err}", self.name);
        } else {
            log::debug!("released {}", self.name);
        }
    }
}

impl Drop for CameraSource {
    fn drop(&mut self) {
        self.release();
    }
}

/// A HighGUI window; keys are polled with a short `wait_key`.
pub struct Window {
    title: String,
    wait_ms: i32,
}

impl Window {
    pub fn open(title: &str) -> Result<Self, DisplayError> {
        highgui::named_window(title, highgui::WINDOW_AUTOSIZE).map_err(backend)?;
        Ok(Self {
            title: title.to_string(),
            wait_ms: 1,
        })
    }

    /// Block until any key is pressed.
    pub fn wait_any_key(&mut self) -> Result<(), DisplayError> {
        highgui::wait_key(0).map_err(backend)?;
        Ok(())
    }

    fn to_bgr(frame: &Frame) -> Result<Mat, DisplayError> {
        let flat = Mat::from_slice(frame.as_raw()).map_err(backend)?;
        let rgb = flat.reshape(3, frame.height() as i32).map_err(backend)?;
        let mut bgr = Mat::default();
        imgproc::cvt_color_def(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR).map_err(backend)?;
        Ok(bgr)
    }

    pub fn show_gray(&mut self, img: &image::GrayImage) -> Result<(), DisplayError> {
        let flat = Mat::from_slice(img.as_raw()).map_err(backend)?;
        let gray = flat.reshape(1, img.height() as i32).map_err(backend)?;
        highgui::imshow(&self.title, &gray).map_err(backend)
    }
}

impl Console for Window {
    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        let bgr = Self::to_bgr(frame)?;
        highgui::imshow(&self.title, &bgr).map_err(backend)
    }

    fn poll_key(&mut self) -> Result<Option<char>, DisplayError> {
        let key = highgui::wait_key(self.wait_ms).map_err(backend)?;
        if key < 0 {
            return Ok(None);
        }
        Ok(char::from_u32((key & 0xFF) as u32))
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        if let Err(err) = highgui::destroy_window(&self.title) {
            log::debug!("destroy_window: {err}");
        }
    }
}
