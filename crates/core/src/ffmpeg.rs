//! FFprobe/FFmpeg command utilities.
//!
//! Thin wrappers around the external binaries, used only by the
//! best-effort thumbnail/duration path. Callers that must never fail
//! (see [`crate::thumbnail`]) absorb these errors.

use std::path::Path;

use serde::Deserialize;

/// Error type for ffprobe/ffmpeg invocations.
#[derive(Debug, thiserror::Error)]
pub enum FfmpegError {
    #[error("ffprobe/ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffprobe/ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("failed to parse ffprobe output: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level ffprobe JSON output (`-print_format json -show_format -show_streams`).
#[derive(Debug, Deserialize)]
pub struct FfprobeOutput {
    #[serde(default)]
    pub streams: Vec<FfprobeStream>,
    pub format: FfprobeFormat,
}

/// A single stream from ffprobe output.
#[derive(Debug, Deserialize)]
pub struct FfprobeStream {
    pub codec_type: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub duration: Option<String>,
}

/// Format-level metadata from ffprobe.
#[derive(Debug, Deserialize)]
pub struct FfprobeFormat {
    pub duration: Option<String>,
}

/// Run `ffprobe` on a staged video file and return the parsed JSON output.
pub async fn probe_video(path: &Path) -> Result<FfprobeOutput, FfmpegError> {
    let output = tokio::process::Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str::<FfprobeOutput>(&stdout)
        .map_err(|e| FfmpegError::ParseError(format!("{e}: {stdout}")))
}

/// Extract a single frame as a JPEG at the given timestamp.
///
/// The frame is scaled to `width` pixels wide, preserving aspect ratio.
pub async fn extract_frame(
    video_path: &Path,
    output_path: &Path,
    timestamp_secs: f64,
    width: u32,
) -> Result<(), FfmpegError> {
    let output = tokio::process::Command::new("ffmpeg")
        .args(["-y", "-ss", &format!("{timestamp_secs:.3}"), "-i"])
        .arg(video_path)
        .args([
            "-vframes",
            "1",
            "-vf",
            &format!("scale={width}:-2"),
            "-q:v",
            "2",
        ])
        .arg(output_path)
        .output()
        .await
        .map_err(FfmpegError::NotFound)?;

    if !output.status.success() {
        return Err(FfmpegError::ExecutionFailed {
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}

/// Parse the duration in seconds from ffprobe output.
///
/// Format-level duration wins; falls back to the first video stream's
/// duration, then to `0.0`.
pub fn parse_duration(probe: &FfprobeOutput) -> f64 {
    if let Some(d) = &probe.format.duration {
        if let Ok(secs) = d.parse::<f64>() {
            return secs;
        }
    }
    if let Some(stream) = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
    {
        if let Some(d) = &stream.duration {
            if let Ok(secs) = d.parse::<f64>() {
                return secs;
            }
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe_with(format_duration: Option<&str>, stream_duration: Option<&str>) -> FfprobeOutput {
        FfprobeOutput {
            streams: vec![FfprobeStream {
                codec_type: Some("video".to_string()),
                width: Some(1920),
                height: Some(1080),
                duration: stream_duration.map(String::from),
            }],
            format: FfprobeFormat {
                duration: format_duration.map(String::from),
            },
        }
    }

    #[test]
    fn test_format_duration_wins() {
        let probe = probe_with(Some("120.5"), Some("60.0"));
        assert_eq!(parse_duration(&probe), 120.5);
    }

    #[test]
    fn test_stream_duration_fallback() {
        let probe = probe_with(None, Some("60.0"));
        assert_eq!(parse_duration(&probe), 60.0);
    }

    #[test]
    fn test_missing_duration_is_zero() {
        let probe = probe_with(None, None);
        assert_eq!(parse_duration(&probe), 0.0);
        let unparsable = probe_with(Some("N/A"), None);
        assert_eq!(parse_duration(&unparsable), 0.0);
    }
}
