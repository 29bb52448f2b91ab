/// ffmpeg adapter - single-frame preview images
use crate::error::{MediaError, Result};
use async_trait::async_trait;
use cinedex_core::types::StreamSelector;
use cinedex_core::ThumbnailRenderer;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use uuid::Uuid;

/// Output width in performance mode (height follows the aspect ratio)
pub const PERFORMANCE_WIDTH: u32 = 640;

/// Where and how thumbnails are written
#[derive(Debug, Clone)]
pub struct ThumbnailSettings {
    pub output_dir: PathBuf,

    /// Downscale to `PERFORMANCE_WIDTH` and encode WebP; otherwise full-size PNG
    pub performance: bool,

    pub file_name_prefix: String,
}

impl ThumbnailSettings {
    pub fn new(output_dir: impl Into<PathBuf>, performance: bool) -> Self {
        Self {
            output_dir: output_dir.into(),
            performance,
            file_name_prefix: "thumbnail_".to_string(),
        }
    }

    fn extension(&self) -> &'static str {
        if self.performance {
            "webp"
        } else {
            "png"
        }
    }

    /// A fresh, collision-free output path
    pub fn next_output_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}{}.{}",
            self.file_name_prefix,
            Uuid::new_v4().simple(),
            self.extension()
        ))
    }
}

#[derive(Debug, Clone)]
pub struct FfmpegRenderer {
    ffmpeg_path: PathBuf,
    settings: ThumbnailSettings,
}

impl FfmpegRenderer {
    pub fn new(ffmpeg_path: impl Into<PathBuf>, settings: ThumbnailSettings) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            settings,
        }
    }

    pub fn settings(&self) -> &ThumbnailSettings {
        &self.settings
    }

    /// Build the ffmpeg argument list for one render
    pub fn command_args(
        &self,
        input: &Path,
        selector: StreamSelector,
        duration_seconds: f64,
        output: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-y"]
            .iter()
            .map(OsString::from)
            .collect();

        match selector {
            StreamSelector::Seek => {
                // Fast seek before the input, decode at most one second
                let midpoint = if duration_seconds.is_finite() && duration_seconds > 0.0 {
                    duration_seconds / 2.0
                } else {
                    0.0
                };
                args.push("-ss".into());
                args.push(format!("{midpoint:.3}").into());
                args.push("-t".into());
                args.push("1".into());
                args.push("-i".into());
                args.push(input.as_os_str().to_os_string());
            }
            StreamSelector::Stream(index) => {
                args.push("-i".into());
                args.push(input.as_os_str().to_os_string());
                args.push("-map".into());
                args.push(format!("0:{index}").into());
            }
        }

        if self.settings.performance {
            args.push("-vf".into());
            args.push(format!("scale={PERFORMANCE_WIDTH}:-1").into());
        }

        args.push("-frames:v".into());
        args.push("1".into());
        args.push(output.as_os_str().to_os_string());
        args
    }

    async fn run(
        &self,
        input: &Path,
        selector: StreamSelector,
        duration_seconds: f64,
    ) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.settings.output_dir)
            .await
            .map_err(|e| {
                MediaError::thumbnail(
                    input,
                    format!(
                        "cannot create {}: {e}",
                        self.settings.output_dir.display()
                    ),
                )
            })?;

        let output_path = self.settings.next_output_path();

        let output = Command::new(&self.ffmpeg_path)
            .args(self.command_args(input, selector, duration_seconds, &output_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                MediaError::thumbnail(
                    input,
                    format!("failed to run {}: {e}", self.ffmpeg_path.display()),
                )
            })?;

        if !output.status.success() {
            discard_partial(&output_path).await;
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::thumbnail(
                input,
                format!("ffmpeg exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        if !tokio::fs::try_exists(&output_path).await.unwrap_or(false) {
            return Err(MediaError::thumbnail(
                input,
                format!("ffmpeg wrote no image to {}", output_path.display()),
            ));
        }

        Ok(output_path)
    }
}

#[async_trait]
impl ThumbnailRenderer for FfmpegRenderer {
    async fn render(
        &self,
        path: &Path,
        selector: StreamSelector,
        duration_seconds: f64,
    ) -> cinedex_core::Result<PathBuf> {
        Ok(self.run(path, selector, duration_seconds).await?)
    }
}

async fn discard_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!("Could not remove partial thumbnail {}: {}", path.display(), e);
        }
    }
}
