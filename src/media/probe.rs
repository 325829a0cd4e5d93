use std::path::Path;

use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, VidsumError};

/// Check if FFprobe is installed and accessible.
pub async fn check_ffprobe() -> Result<()> {
    let output = Command::new("ffprobe")
        .arg("-version")
        .output()
        .await
        .map_err(|e| {
            VidsumError::Probe(format!(
                "FFprobe not found. Please install FFmpeg (includes FFprobe). Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(VidsumError::Probe("FFprobe check failed".to_string()));
    }

    debug!("FFprobe is available");
    Ok(())
}

/// Get the container duration of a media file in seconds.
pub async fn probe_duration(input: &Path) -> Result<f64> {
    if !input.exists() {
        return Err(VidsumError::Probe(format!(
            "File not found: {}",
            input.display()
        )));
    }

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input)
        .output()
        .await
        .map_err(|e| VidsumError::Probe(format!("Failed to run FFprobe: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VidsumError::Probe(format!(
            "FFprobe failed: {}",
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let duration = parse_duration(&stdout)?;
    debug!("Probed {}: {:.2}s", input.display(), duration);
    Ok(duration)
}

/// Parse ffprobe's bare `format=duration` output.
pub(crate) fn parse_duration(raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    let secs: f64 = trimmed
        .parse()
        .map_err(|e| VidsumError::Probe(format!("Failed to parse duration '{trimmed}': {e}")))?;

    if !secs.is_finite() || secs < 0.0 {
        return Err(VidsumError::Probe(format!("Invalid duration: {trimmed}")));
    }

    Ok(secs)
}
