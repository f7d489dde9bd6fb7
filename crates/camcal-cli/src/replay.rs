//! Headless collaborators: image-directory replay and scripted keys.

use camcal_core::{Console, DisplayError, Frame, FrameSource, SourceError};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Replays the images of a directory in file-name order, cycling forever.
#[derive(Debug)]
pub struct ImageDirSource {
    dir: PathBuf,
    files: Vec<PathBuf>,
    next: usize,
    released: bool,
}

impl ImageDirSource {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let dir = dir.as_ref().to_path_buf();
        let mut files = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
            if path.is_file() && is_image {
                files.push(path);
            }
        }
        if files.is_empty() {
            return Err(SourceError::Empty(dir.display().to_string()));
        }
        files.sort();
        log::info!("replaying {} images from {}", files.len(), dir.display());
        Ok(Self {
            dir,
            files,
            next: 0,
            released: false,
        })
    }
}

impl FrameSource for ImageDirSource {
    fn read(&mut self) -> Result<Frame, SourceError> {
        if self.released {
            return Err(SourceError::Read(self.dir.display().to_string()));
        }
        let path = &self.files[self.next % self.files.len()];
        self.next += 1;
        log::trace!("frame {} <- {}", self.next, path.display());
        Ok(image::open(path)?.to_rgb8())
    }

    fn release(&mut self) {
        if !self.released {
            log::debug!("closing replay of {}", self.dir.display());
            self.released = true;
        }
    }
}

impl Drop for ImageDirSource {
    fn drop(&mut self) {
        self.release();
    }
}

/// Key presses from a fixed script, one per polled frame.
///
/// `.` means "no key", whitespace is skipped, and an exhausted script keeps
/// answering `exit_key`.
#[derive(Debug)]
pub struct ScriptedConsole {
    keys: VecDeque<char>,
    exit_key: char,
    shown: usize,
}

impl ScriptedConsole {
    pub fn new(script: &str) -> Self {
        Self {
            keys: script.chars().filter(|c| !c.is_whitespace()).collect(),
            exit_key: 'q',
            shown: 0,
        }
    }

    #[cfg(test)]
    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl Console for ScriptedConsole {
    fn show(&mut self, _frame: &Frame) -> Result<(), DisplayError> {
        self.shown += 1;
        Ok(())
    }

    fn poll_key(&mut self) -> Result<Option<char>, DisplayError> {
        Ok(match self.keys.pop_front() {
            Some('.') => None,
            Some(k) => Some(k),
            None => Some(self.exit_key),
        })
    }
}

/// Saves every shown frame as `frame_NNNNN.png` before passing it on.
pub struct FrameDump<C> {
    inner: C,
    dir: PathBuf,
    count: usize,
}

impl<C: Console> FrameDump<C> {
    pub fn new(inner: C, dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            inner,
            dir,
            count: 0,
        })
    }
}

impl<C: Console> Console for FrameDump<C> {
    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        let path = self.dir.join(format!("frame_{:05}.png", self.count));
        frame.save(&path)?;
        self.count += 1;
        self.inner.show(frame)
    }

    fn poll_key(&mut self) -> Result<Option<char>, DisplayError> {
        self.inner.poll_key()
    }
}
