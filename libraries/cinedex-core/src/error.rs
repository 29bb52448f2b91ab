/// Core error types for Cinedex
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `CinedexError`
pub type Result<T> = std::result::Result<T, CinedexError>;

/// Core error type for Cinedex
#[derive(Error, Debug)]
pub enum CinedexError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// The probing tool exited non-zero or produced unparsable output
    #[error("Probe failed for {}: {reason}", path.display())]
    ProbeFailed { path: PathBuf, reason: String },

    /// The rendering tool exited non-zero or produced no image
    #[error("Thumbnail failed for {}: {reason}", path.display())]
    ThumbnailFailed { path: PathBuf, reason: String },

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl CinedexError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a probe failure for `path`
    pub fn probe_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ProbeFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a thumbnail failure for `path`
    pub fn thumbnail_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ThumbnailFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
