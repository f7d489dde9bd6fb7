use camcal_core::{ConfigError, DisplayError, RunError, SourceError};

/// Everything that ends the process with a non-zero status.
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("invalid board configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Display(#[from] DisplayError),
    #[error(transparent)]
    Run(#[from] RunError),
    #[error("failed to write {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Unsupported(&'static str),
}

pub type CliResult<T> = Result<T, CliError>;
