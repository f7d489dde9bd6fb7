use crate::source::Frame;

/// Display or keyboard failures. Fatal to the run.
#[derive(thiserror::Error, Debug)]
pub enum DisplayError {
    #[error("display backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Where annotated frames go and where key presses come from.
pub trait Console {
    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError>;

    /// Wait a short, bounded time for a key press.
    fn poll_key(&mut self) -> Result<Option<char>, DisplayError>;
}

impl<C: Console + ?Sized> Console for &mut C {
    fn show(&mut self, frame: &Frame) -> Result<(), DisplayError> {
        (**self).show(frame)
    }

    fn poll_key(&mut self) -> Result<Option<char>, DisplayError> {
        (**self).poll_key()
    }
}
