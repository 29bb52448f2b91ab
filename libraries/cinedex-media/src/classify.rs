//! Thumbnail source stream classification
//!
//! Decides from probe data alone (no decoding) whether a video stream is
//! really a still picture such as embedded cover art.

use cinedex_core::types::{StreamInfo, StreamSelector};

/// Codecs that only ever carry still images
pub const STILL_IMAGE_CODECS: &[&str] = &["mjpeg", "png", "bmp"];

/// Streams below this bitrate (bits/s) are treated as stills
pub const LOW_BITRATE_THRESHOLD: u64 = 10_000;

/// Streams shorter than this (but longer than zero) are treated as stills
pub const MAX_STILL_DURATION_SECONDS: f64 = 0.5;

/// Whether `stream` is a still image rather than playable video
///
/// Non-video streams are never a thumbnail source. A video stream qualifies if
/// any heuristic matches: attached-picture disposition, still-image codec,
/// duration in (0, 0.5) s, at most one frame, or bitrate under 10 kb/s.
pub fn is_likely_static_image(stream: &StreamInfo) -> bool {
    if !stream.is_video() {
        return false;
    }

    if stream.disposition.attached_pic == 1 {
        return true;
    }

    if stream
        .codec_name
        .as_deref()
        .is_some_and(|codec| STILL_IMAGE_CODECS.contains(&codec))
    {
        return true;
    }

    if stream
        .duration_seconds()
        .is_some_and(|d| d > 0.0 && d < MAX_STILL_DURATION_SECONDS)
    {
        return true;
    }

    if stream.frame_count().is_some_and(|frames| frames <= 1) {
        return true;
    }

    stream
        .bit_rate_bps()
        .is_some_and(|rate| rate < LOW_BITRATE_THRESHOLD)
}

/// Pick the first still-image stream, or fall back to seeking
pub fn select_thumbnail_stream(streams: &[StreamInfo]) -> StreamSelector {
    streams
        .iter()
        .find(|stream| is_likely_static_image(stream))
        .map_or(StreamSelector::Seek, |stream| {
            StreamSelector::Stream(stream.index)
        })
}
