//! Best-effort still-image previews from video payloads.
//!
//! Thumbnailing is cosmetic: every failure path here returns `None` and
//! must never block or fail ingestion or playback. Payloads live in the
//! store as blobs, so probing stages them to a temp file first.

use std::io::Write;

use crate::ffmpeg;

/// Default position of the sampled frame as a fraction of total duration.
pub const DEFAULT_SEEK_FRACTION: f64 = 0.1;

/// Width of generated thumbnails in pixels (height follows aspect ratio).
pub const THUMBNAIL_WIDTH: u32 = 320;

/// Probe a payload's duration in seconds. `None` on any failure or when
/// the duration is unknown.
pub async fn probe_duration_secs(payload: &[u8]) -> Option<f64> {
    if payload.is_empty() {
        return None;
    }
    let staged = stage_payload(payload)?;
    let probe = match ffmpeg::probe_video(staged.path()).await {
        Ok(probe) => probe,
        Err(e) => {
            tracing::debug!(error = %e, "duration probe failed");
            return None;
        }
    };
    let duration = ffmpeg::parse_duration(&probe);
    (duration > 0.0).then_some(duration)
}

/// Extract one JPEG frame at `seek_fraction` of the payload's duration.
///
/// Returns `None` on empty payload, unknown duration, or any
/// probe/decode failure.
pub async fn extract(payload: &[u8], seek_fraction: f64) -> Option<Vec<u8>> {
    if payload.is_empty() {
        return None;
    }
    let staged = stage_payload(payload)?;
    let duration = match ffmpeg::probe_video(staged.path()).await {
        Ok(probe) => ffmpeg::parse_duration(&probe),
        Err(e) => {
            tracing::debug!(error = %e, "thumbnail probe failed");
            return None;
        }
    };
    if duration <= 0.0 {
        return None;
    }

    let timestamp = duration * seek_fraction.clamp(0.0, 1.0);
    let output = tempfile::Builder::new().suffix(".jpg").tempfile().ok()?;
    if let Err(e) =
        ffmpeg::extract_frame(staged.path(), output.path(), timestamp, THUMBNAIL_WIDTH).await
    {
        tracing::debug!(error = %e, "thumbnail frame extraction failed");
        return None;
    }

    match std::fs::read(output.path()) {
        Ok(bytes) if !bytes.is_empty() => Some(bytes),
        _ => None,
    }
}

/// Write a payload to a named temp file for the external tools to read.
fn stage_payload(payload: &[u8]) -> Option<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new().ok()?;
    file.write_all(payload).ok()?;
    file.flush().ok()?;
    Some(file)
}
