/// ffprobe adapter - container and stream metadata without decoding
use crate::error::{MediaError, Result};
use async_trait::async_trait;
use cinedex_core::types::ProbeResult;
use cinedex_core::MediaProbe;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    /// Arguments for probing `input`: JSON output, format + video streams
    pub fn command_args(input: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
            "-select_streams",
            "v",
            "-show_entries",
            "stream_tags:format_tags",
            "-v",
            "quiet",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        args.push(input.as_os_str().to_os_string());
        args
    }

    async fn run(&self, input: &Path) -> Result<ProbeResult> {
        let output = Command::new(&self.ffprobe_path)
            .args(Self::command_args(input))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                MediaError::probe(
                    input,
                    format!("failed to run {}: {e}", self.ffprobe_path.display()),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::probe(
                input,
                format!("ffprobe exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        parse_probe_output(input, &output.stdout)
    }
}

#[async_trait]
impl MediaProbe for FfprobeProber {
    async fn probe(&self, path: &Path) -> cinedex_core::Result<ProbeResult> {
        tracing::trace!("Probing {}", path.display());
        Ok(self.run(path).await?)
    }
}

/// Parse ffprobe's JSON output for `input`
pub fn parse_probe_output(input: &Path, stdout: &[u8]) -> Result<ProbeResult> {
    if stdout.iter().all(u8::is_ascii_whitespace) {
        return Err(MediaError::probe(input, "ffprobe produced no output"));
    }

    serde_json::from_slice(stdout)
        .map_err(|e| MediaError::probe(input, format!("failed to parse ffprobe output: {e}")))
}
