use crate::error::Result;
use crate::media::{derive_audio_path, MediaProcessor};
use crate::summarize::{summary_length, Summarizer};
use crate::temp::TempFile;
use crate::transcribe::Transcriber;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Steps a single request passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Probed,
    Transcoded,
    Transcribed,
    Summarized,
    CleanedUp,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Probed => "probed",
            PipelineStage::Transcoded => "transcoded",
            PipelineStage::Transcribed => "transcribed",
            PipelineStage::Summarized => "summarized",
            PipelineStage::CleanedUp => "cleaned-up",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Result of summarizing one uploaded video.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub summary: String,
    /// Media duration reported by the prober, in seconds.
    pub duration_secs: f64,
    /// Sentence count requested from the summarizer.
    pub sentences: u32,
    pub elapsed: Duration,
}

/// Sequences probe, transcode, transcribe and summarize for one upload.
///
/// The pipeline holds no per-request state and is shared across requests.
#[derive(Clone)]
pub struct SummaryPipeline {
    media: Arc<dyn MediaProcessor>,
    transcriber: Arc<dyn Transcriber>,
    summarizer: Arc<dyn Summarizer>,
}

impl SummaryPipeline {
    pub fn new(
        media: Arc<dyn MediaProcessor>,
        transcriber: Arc<dyn Transcriber>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            media,
            transcriber,
            summarizer,
        }
    }

    /// Summarize an uploaded video.
    ///
    /// Every step waits for the previous one. The upload and the extracted
    /// audio are deleted before this returns, whether it succeeds or fails.
    pub async fn run(&self, upload: TempFile) -> Result<PipelineResult> {
        let mut reached = PipelineStage::Received;
        let result = self.run_stages(upload, &mut reached).await;
        if let Err(e) = &result {
            error!(stage = %PipelineStage::Failed, "Failed after {}: {}", reached, e);
        }
        result
    }

    /// Runs each step in turn, recording the last stage completed in `reached`.
    async fn run_stages(
        &self,
        mut upload: TempFile,
        reached: &mut PipelineStage,
    ) -> Result<PipelineResult> {
        let start = Instant::now();
        info!(stage = %PipelineStage::Received, "Processing {}", upload.path().display());

        let duration_secs = self.media.probe_duration(upload.path()).await?;
        let sentences = summary_length(duration_secs);
        *reached = PipelineStage::Probed;
        info!(
            stage = %PipelineStage::Probed,
            "Duration {:.1}s, requesting {} sentences", duration_secs, sentences
        );

        // Owned before ffmpeg runs so partial output is also removed.
        let mut audio = TempFile::new(derive_audio_path(upload.path()));
        self.media
            .extract_audio(upload.path(), audio.path())
            .await?;
        *reached = PipelineStage::Transcoded;
        info!(stage = %PipelineStage::Transcoded, "Audio at {}", audio.path().display());

        let transcript = self.transcriber.transcribe(audio.path()).await?;
        *reached = PipelineStage::Transcribed;
        info!(
            stage = %PipelineStage::Transcribed,
            "{} returned {} chars", self.transcriber.name(), transcript.len()
        );

        let summary = self.summarizer.summarize(&transcript, sentences).await?;
        *reached = PipelineStage::Summarized;
        info!(
            stage = %PipelineStage::Summarized,
            "{} returned {} chars", self.summarizer.name(), summary.len()
        );

        for file in [&mut upload, &mut audio] {
            if let Err(e) = file.remove() {
                warn!("Failed to remove {}: {}", file.path().display(), e);
            }
        }
        *reached = PipelineStage::CleanedUp;
        let elapsed = start.elapsed();
        info!(
            stage = %PipelineStage::CleanedUp,
            "Pipeline finished in {:.2}s", elapsed.as_secs_f64()
        );

        Ok(PipelineResult {
            summary,
            duration_secs,
            sentences,
            elapsed,
        })
    }
}
