/// Capability traits for the external media tool
use crate::error::Result;
use crate::types::{ProbeResult, StreamSelector};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Container/stream metadata extraction
///
/// Implementers inspect a media file without decoding it fully. A failure is
/// always scoped to the one file and reported as `CinedexError::ProbeFailed`.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    /// Probe the file at `path`
    ///
    /// # Errors
    /// Returns `ProbeFailed` if the tool exits non-zero or its output cannot be parsed
    async fn probe(&self, path: &Path) -> Result<ProbeResult>;
}

/// Preview image generation
#[async_trait]
pub trait ThumbnailRenderer: Send + Sync {
    /// Render a single preview frame of `path` and return the new image's path
    ///
    /// Every call must produce a distinct output file so concurrent renders
    /// never collide.
    ///
    /// # Errors
    /// Returns `ThumbnailFailed` if the tool exits non-zero or no image was written
    async fn render(
        &self,
        path: &Path,
        selector: StreamSelector,
        duration_seconds: f64,
    ) -> Result<PathBuf>;
}
