//! Loader error types.

use std::path::PathBuf;

/// Hard failures of discovery or track resolution.
///
/// Every variant except [`LoadError::InvalidTrack`] aborts discovery; the
/// loader is left in the failed state and a fresh source has to be built to
/// retry.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No recognizable game directory or no matching game-data entries.
    #[error("no game data found")]
    NoGameData,

    /// The requested audio track was never recorded by the source.
    #[error("invalid CD-DA track {0}")]
    InvalidTrack(u32),

    /// The archive extraction service or worker reported a failure.
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// Host input the loader cannot open as any known container.
    #[error("unsupported input: {}", .0.display())]
    UnsupportedInput(PathBuf),

    /// `get_cdda` was called before discovery finished.
    #[error("game data has not been loaded")]
    NotLoaded,

    /// `start_load` was called more than once.
    #[error("game data has already been loaded")]
    AlreadyLoaded,

    /// IO error while reading input or writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoadError {
    pub(crate) fn extraction(err: impl std::fmt::Display) -> Self {
        LoadError::ExtractionFailed(err.to_string())
    }
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoadError>;
