//! Record builder
//!
//! Turns one media file into a `CatalogRecord`: probe, pick the thumbnail
//! source, render, then derive the identifier from the resolved paths.

use crate::classify::select_thumbnail_stream;
use crate::extras::build_extras;
use cinedex_core::types::{CatalogRecord, RecordId};
use cinedex_core::{CinedexError, MediaProbe, Result, ThumbnailRenderer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

/// Builds catalog records through the media capabilities
#[derive(Clone)]
pub struct RecordBuilder {
    prober: Arc<dyn MediaProbe>,
    renderer: Arc<dyn ThumbnailRenderer>,
}

impl RecordBuilder {
    pub fn new(prober: Arc<dyn MediaProbe>, renderer: Arc<dyn ThumbnailRenderer>) -> Self {
        Self { prober, renderer }
    }

    /// Build the record for `path`
    ///
    /// The media path is stored with its directory resolved but the file
    /// itself left as named, so a symlinked file stays a symlink in the catalog.
    ///
    /// # Errors
    /// `ProbeFailed` or `ThumbnailFailed` from the capabilities, `Io` if the
    /// file disappears mid-build, `InvalidInput` for a file name that is not
    /// UTF-8 (checked before any tool runs). A thumbnail written before a
    /// later step fails is removed again.
    pub async fn build(&self, path: &Path) -> Result<CatalogRecord> {
        let media_path = resolve_media_path(path).await?;
        let title = media_path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                CinedexError::invalid_input(format!(
                    "media file name is not valid UTF-8: {}",
                    media_path.display()
                ))
            })?;

        let probe = self.prober.probe(&media_path).await?;
        let selector = select_thumbnail_stream(&probe.streams);
        let duration = probe.format.duration_seconds();

        tracing::trace!(
            "Rendering thumbnail for {} using {:?}",
            media_path.display(),
            selector
        );
        let rendered = self.renderer.render(&media_path, selector, duration).await?;

        match self.finish(&media_path, title, &rendered, &probe).await {
            Ok(record) => Ok(record),
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&rendered).await {
                    tracing::debug!(
                        "Could not remove orphaned thumbnail {}: {}",
                        rendered.display(),
                        remove_err
                    );
                }
                Err(e)
            }
        }
    }

    async fn finish(
        &self,
        media_path: &Path,
        title: String,
        rendered: &Path,
        probe: &cinedex_core::types::ProbeResult,
    ) -> Result<CatalogRecord> {
        let thumbnail_path = tokio::fs::canonicalize(rendered).await?;
        let metadata = tokio::fs::metadata(media_path).await?;

        let modified_time_unix = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0.0, |d| d.as_secs_f64());

        Ok(CatalogRecord {
            id: RecordId::derive(media_path, &thumbnail_path, modified_time_unix),
            title,
            media_path: media_path.to_path_buf(),
            thumbnail_path,
            duration_seconds: probe.duration_seconds(),
            file_size_bytes: metadata.len(),
            modified_time_unix,
            extras: build_extras(probe)?,
        })
    }
}

/// Absolute path of `path` with every directory component resolved
async fn resolve_media_path(path: &Path) -> Result<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        CinedexError::invalid_input(format!("not a file path: {}", path.display()))
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let resolved = tokio::fs::canonicalize(parent).await?.join(file_name);
    if !tokio::fs::try_exists(&resolved).await? {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", resolved.display()),
        )
        .into());
    }
    Ok(resolved)
}

impl std::fmt::Debug for RecordBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordBuilder").finish_non_exhaustive()
    }
}
