//! Cinedex Media
//!
//! Metadata extraction and thumbnail generation for the media catalog.
//!
//! This crate provides:
//! - `FfprobeProber` / `FfmpegRenderer`: subprocess adapters implementing the
//!   core `MediaProbe` and `ThumbnailRenderer` capabilities
//! - Still-image stream classification used to pick the thumbnail source
//! - `RecordBuilder`: probe + render + content-derived id for one file
//! - `Extractor`: runs the builder over many files with a strict concurrency
//!   bound, isolating per-file failures
//!
//! # Example
//!
//! ```rust,no_run
//! use cinedex_media::{Extractor, FfmpegRenderer, FfprobeProber, RecordBuilder, ThumbnailSettings};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let builder = RecordBuilder::new(
//!     Arc::new(FfprobeProber::new("ffprobe")),
//!     Arc::new(FfmpegRenderer::new("ffmpeg", ThumbnailSettings::new("/tmp/thumbs", true))),
//! );
//! let extractor = Extractor::new(builder, 4);
//! let report = extractor
//!     .extract(vec![PathBuf::from("/videos/clip.mp4")], &Default::default())
//!     .await;
//! println!("{} built, {} failed", report.records.len(), report.failures.len());
//! # }
//! ```

mod builder;
mod classify;
mod error;
mod extractor;
mod extras;
mod ffmpeg;
mod ffprobe;

pub use builder::RecordBuilder;
pub use classify::{
    is_likely_static_image, select_thumbnail_stream, LOW_BITRATE_THRESHOLD,
    MAX_STILL_DURATION_SECONDS, STILL_IMAGE_CODECS,
};
pub use error::{MediaError, Result};
pub use extractor::{ExtractionProgress, ExtractionReport, Extractor, ProgressCallback};
pub use extras::build_extras;
pub use ffmpeg::{FfmpegRenderer, ThumbnailSettings, PERFORMANCE_WIDTH};
pub use ffprobe::{parse_probe_output, FfprobeProber};
