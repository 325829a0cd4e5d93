pub mod extract;
pub mod probe;

pub use extract::{check_ffmpeg, derive_audio_path, extract_audio, read_wav_metadata};
pub use probe::{check_ffprobe, probe_duration};

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Metadata about an extracted audio file.
#[derive(Debug, Clone)]
pub struct AudioMetadata {
    pub duration: Duration,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Local media inspection and transcoding.
#[async_trait]
pub trait MediaProcessor: Send + Sync {
    /// Duration of the media container in seconds.
    async fn probe_duration(&self, input: &Path) -> Result<f64>;

    /// Write the audio track of `input` as WAV to `output`.
    async fn extract_audio(&self, input: &Path, output: &Path) -> Result<AudioMetadata>;
}

/// `MediaProcessor` backed by the `ffprobe` and `ffmpeg` executables.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegMedia;

#[async_trait]
impl MediaProcessor for FfmpegMedia {
    async fn probe_duration(&self, input: &Path) -> Result<f64> {
        probe::probe_duration(input).await
    }

    async fn extract_audio(&self, input: &Path, output: &Path) -> Result<AudioMetadata> {
        extract::extract_audio(input, output).await
    }
}
