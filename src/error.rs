use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidcutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

pub type Result<T> = std::result::Result<T, VidcutError>;

/// Reasons an extraction request did not produce an output file.
///
/// Each message is shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("ffmpeg not found. Please install ffmpeg and add it to your PATH.")]
    ProcessorUnavailable,

    #[error("No video file selected")]
    NoSourceSelected,

    #[error("Please enter valid time values")]
    InvalidTimeFormat,

    #[error("Prefix must not contain path separators")]
    InvalidPrefix,

    #[error("Start time must be less than end time")]
    InvalidTimeOrder,

    #[error("Please select output directory")]
    MissingOutputDirectory,

    #[error("Please enter a prefix")]
    MissingPrefix,

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    #[error("An extraction is already running")]
    ExtractionInProgress,
}

impl ExtractError {
    /// True for failures detected before any process was launched.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ExtractError::NoSourceSelected
                | ExtractError::InvalidTimeFormat
                | ExtractError::InvalidTimeOrder
                | ExtractError::MissingOutputDirectory
                | ExtractError::MissingPrefix
                | ExtractError::InvalidPrefix
        )
    }
}
