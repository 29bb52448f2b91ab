/// Media adapter errors
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `MediaError`
pub type Result<T> = std::result::Result<T, MediaError>;

/// Failures of the external media tool, always scoped to one file
#[derive(Error, Debug)]
pub enum MediaError {
    /// ffprobe could not run, exited non-zero, or printed unparsable JSON
    #[error("Probe failed for {}: {reason}", path.display())]
    Probe { path: PathBuf, reason: String },

    /// ffmpeg could not run, exited non-zero, or wrote no image
    #[error("Thumbnail failed for {}: {reason}", path.display())]
    Thumbnail { path: PathBuf, reason: String },
}

impl MediaError {
    pub fn probe(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Probe {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn thumbnail(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Thumbnail {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<MediaError> for cinedex_core::CinedexError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::Probe { path, reason } => Self::probe_failed(path, reason),
            MediaError::Thumbnail { path, reason } => Self::thumbnail_failed(path, reason),
        }
    }
}
