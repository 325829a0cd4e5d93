use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, VidsumError};

use super::AudioMetadata;

/// Check if FFmpeg is installed and accessible.
pub async fn check_ffmpeg() -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-version")
        .output()
        .await
        .map_err(|e| {
            VidsumError::Transcode(format!(
                "FFmpeg not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(VidsumError::Transcode("FFmpeg check failed".to_string()));
    }

    debug!("FFmpeg is available");
    Ok(())
}

/// Sibling path with the same base name and a `.wav` extension.
///
/// An input that is already `.wav` gets `.audio.wav` so it is not overwritten.
pub fn derive_audio_path(video: &Path) -> PathBuf {
    let candidate = video.with_extension("wav");
    if candidate == video {
        video.with_extension("audio.wav")
    } else {
        candidate
    }
}

/// Extract the audio track of `input` into a 16-bit PCM WAV file at `output`.
///
/// Video streams are dropped. The WAV header of the result is read back to
/// report its format; an unreadable header is treated as a failed transcode.
pub async fn extract_audio(input: &Path, output: &Path) -> Result<AudioMetadata> {
    if !input.exists() {
        return Err(VidsumError::Transcode(format!(
            "File not found: {}",
            input.display()
        )));
    }

    if input == output {
        return Err(VidsumError::Transcode(format!(
            "Output would overwrite input: {}",
            input.display()
        )));
    }

    info!("Extracting audio from {}", input.display());

    let result = Command::new("ffmpeg")
        .args(["-y", "-i"])
        .arg(input)
        .args(["-vn", "-acodec", "pcm_s16le"])
        .arg(output)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| VidsumError::Transcode(format!("Failed to run FFmpeg: {e}")))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let last_line = stderr.lines().last().unwrap_or("unknown error");
        return Err(VidsumError::Transcode(format!("FFmpeg failed: {last_line}")));
    }

    let metadata = read_wav_metadata(output)?;
    info!(
        "Audio extracted to {} ({} Hz, {} ch, {:.1}s)",
        output.display(),
        metadata.sample_rate,
        metadata.channels,
        metadata.duration.as_secs_f64()
    );

    Ok(metadata)
}

/// Read the format of a WAV file from its header.
pub fn read_wav_metadata(path: &Path) -> Result<AudioMetadata> {
    let reader = hound::WavReader::open(path).map_err(|e| {
        VidsumError::Transcode(format!("Invalid WAV output {}: {e}", path.display()))
    })?;

    let spec = reader.spec();
    let duration = if spec.sample_rate > 0 {
        Duration::from_secs_f64(reader.duration() as f64 / spec.sample_rate as f64)
    } else {
        Duration::ZERO
    };

    Ok(AudioMetadata {
        duration,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, sample_rate: u32, channels: u16, frames: u32) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..frames * channels as u32 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn ffmpeg_available() -> bool {
        std::process::Command::new("ffmpeg")
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_derive_audio_path() {
        assert_eq!(
            derive_audio_path(Path::new("uploads/videoFile-1700000000000.mp4")),
            PathBuf::from("uploads/videoFile-1700000000000.wav")
        );
        assert_eq!(
            derive_audio_path(Path::new("uploads/videoFile-1")),
            PathBuf::from("uploads/videoFile-1.wav")
        );
        assert_eq!(
            derive_audio_path(Path::new("uploads/videoFile-2.wav")),
            PathBuf::from("uploads/videoFile-2.audio.wav")
        );
    }

    #[test]
    fn test_read_wav_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, 16000, 2, 32000);

        let metadata = read_wav_metadata(&path).unwrap();
        assert_eq!(metadata.sample_rate, 16000);
        assert_eq!(metadata.channels, 2);
        assert_eq!(metadata.duration, Duration::from_secs(2));
    }

    #[test]
    fn test_read_wav_metadata_rejects_non_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.wav");
        std::fs::write(&path, b"not a wav file").unwrap();

        assert!(matches!(
            read_wav_metadata(&path),
            Err(VidsumError::Transcode(_))
        ));
    }

    #[tokio::test]
    async fn test_extract_audio_file_not_found() {
        let result =
            extract_audio(Path::new("/nonexistent/file.mp4"), Path::new("/tmp/out.wav")).await;
        match result {
            Err(VidsumError::Transcode(msg)) => assert!(msg.contains("nonexistent")),
            other => panic!("Expected Transcode error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_extract_audio_corrupt_input() {
        if !ffmpeg_available() {
            eprintln!("Skipping test: FFmpeg not available");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("corrupt.mp4");
        std::fs::write(&input, b"definitely not a video").unwrap();

        let result = extract_audio(&input, &derive_audio_path(&input)).await;
        assert!(matches!(result, Err(VidsumError::Transcode(_))));
    }

    #[tokio::test]
    async fn test_extract_audio_from_wav() {
        if !ffmpeg_available() {
            eprintln!("Skipping test: FFmpeg not available");
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("source.wav");
        write_wav(&input, 8000, 1, 8000);
        let output = dir.path().join("extracted.wav");

        let metadata = extract_audio(&input, &output).await.unwrap();
        assert!(output.exists());
        assert_eq!(metadata.channels, 1);
        assert_eq!(metadata.sample_rate, 8000);
    }
}
