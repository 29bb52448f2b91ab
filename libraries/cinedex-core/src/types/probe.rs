//! Probe result types
//!
//! Mirrors the subset of `ffprobe -print_format json` output the catalog
//! keeps. ffprobe reports most numeric fields as strings, so they are stored
//! verbatim and parsed through the accessor methods.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured output of a media probe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    #[serde(default)]
    pub format: FormatInfo,

    #[serde(default)]
    pub streams: Vec<StreamInfo>,
}

impl ProbeResult {
    /// Container duration in whole seconds (0 when unknown)
    pub fn duration_seconds(&self) -> u64 {
        self.format.duration_seconds().max(0.0) as u64
    }
}

/// Container-level fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_long_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_score: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Map<String, Value>>,
}

impl FormatInfo {
    /// Reported duration in seconds (0.0 when missing or unparsable)
    pub fn duration_seconds(&self) -> f64 {
        parse_number(self.duration.as_deref()).unwrap_or(0.0)
    }

    /// Reported container size in bytes
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

/// Per-stream descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    #[serde(default)]
    pub index: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec_long_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix_fmt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_frame_rate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_frame_rate: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb_frames: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<String>,

    #[serde(default)]
    pub disposition: Disposition,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Map<String, Value>>,
}

impl StreamInfo {
    /// Whether ffprobe reported this as a video stream
    pub fn is_video(&self) -> bool {
        self.codec_type.as_deref() == Some("video")
    }

    /// Reported stream duration in seconds
    pub fn duration_seconds(&self) -> Option<f64> {
        parse_number(self.duration.as_deref())
    }

    /// Reported frame count
    pub fn frame_count(&self) -> Option<u64> {
        self.nb_frames.as_deref().and_then(|s| s.trim().parse().ok())
    }

    /// Reported bitrate in bits per second
    pub fn bit_rate_bps(&self) -> Option<u64> {
        self.bit_rate.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

/// Stream disposition flags (ffprobe reports them as 0/1 integers)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disposition {
    #[serde(default)]
    pub attached_pic: u8,

    #[serde(default)]
    pub still_image: u8,
}

/// Which frame the thumbnail renderer should extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSelector {
    /// No still-image stream: seek to the midpoint and grab one frame
    Seek,
    /// Map this stream index directly and take its first frame
    Stream(u32),
}

fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
