//! Test doubles shared by the pipeline and HTTP tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vidsum::error::{Result, VidsumError};
use vidsum::media::{AudioMetadata, MediaProcessor};
use vidsum::summarize::Summarizer;
use vidsum::transcribe::Transcriber;
use vidsum::SummaryPipeline;

/// Reports a fixed duration and writes a placeholder audio file.
pub struct FakeMedia {
    pub duration: Result<f64>,
    pub fail_extract: bool,
    pub extract_calls: AtomicUsize,
    pub extracted: Mutex<Vec<PathBuf>>,
}

impl FakeMedia {
    pub fn with_duration(secs: f64) -> Self {
        Self {
            duration: Ok(secs),
            fail_extract: false,
            extract_calls: AtomicUsize::new(0),
            extracted: Mutex::new(Vec::new()),
        }
    }

    pub fn unprobeable() -> Self {
        Self {
            duration: Err(VidsumError::Probe(
                "Invalid data found when processing input".to_string(),
            )),
            ..Self::with_duration(0.0)
        }
    }

    pub fn failing_extract(secs: f64) -> Self {
        Self {
            fail_extract: true,
            ..Self::with_duration(secs)
        }
    }
}

#[async_trait]
impl MediaProcessor for FakeMedia {
    async fn probe_duration(&self, input: &Path) -> Result<f64> {
        assert!(input.exists(), "probe called on missing file");
        match &self.duration {
            Ok(secs) => Ok(*secs),
            Err(VidsumError::Probe(msg)) => Err(VidsumError::Probe(msg.clone())),
            Err(other) => panic!("unexpected probe setup: {other}"),
        }
    }

    async fn extract_audio(&self, input: &Path, output: &Path) -> Result<AudioMetadata> {
        assert!(input.exists(), "extract called on missing file");
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        self.extracted.lock().unwrap().push(output.to_path_buf());

        // Partial output before failing, as ffmpeg would leave behind.
        std::fs::write(output, b"RIFF")?;
        if self.fail_extract {
            return Err(VidsumError::Transcode("Invalid data found".to_string()));
        }

        Ok(AudioMetadata {
            duration: Duration::from_secs_f64(self.duration.as_ref().copied().unwrap_or(0.0)),
            sample_rate: 16000,
            channels: 1,
        })
    }
}

pub enum TranscriptOutcome {
    Text(String),
    Failed,
}

pub struct FakeTranscriber {
    pub outcome: TranscriptOutcome,
    pub calls: AtomicUsize,
}

impl FakeTranscriber {
    pub fn returning(text: &str) -> Self {
        Self {
            outcome: TranscriptOutcome::Text(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            outcome: TranscriptOutcome::Failed,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String> {
        assert!(audio.exists(), "transcribe called before audio was written");
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            TranscriptOutcome::Text(text) => Ok(text.clone()),
            TranscriptOutcome::Failed => Err(VidsumError::TranscriptionFailed(
                "remote job failed".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "fake-transcriber"
    }
}

pub struct FakeSummarizer {
    pub fail: bool,
    pub requests: Mutex<Vec<(String, u32)>>,
}

impl FakeSummarizer {
    pub fn new() -> Self {
        Self {
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, text: &str, sentences: u32) -> Result<String> {
        self.requests
            .lock()
            .unwrap()
            .push((text.to_string(), sentences));
        if self.fail {
            return Err(VidsumError::Summarization("quota exceeded".to_string()));
        }
        Ok(format!("## Summary\n{sentences} sentences about: {text}"))
    }

    fn name(&self) -> &'static str {
        "fake-summarizer"
    }
}

pub struct Fixture {
    pub media: Arc<FakeMedia>,
    pub transcriber: Arc<FakeTranscriber>,
    pub summarizer: Arc<FakeSummarizer>,
}

impl Fixture {
    pub fn new(media: FakeMedia, transcriber: FakeTranscriber, summarizer: FakeSummarizer) -> Self {
        Self {
            media: Arc::new(media),
            transcriber: Arc::new(transcriber),
            summarizer: Arc::new(summarizer),
        }
    }

    pub fn pipeline(&self) -> SummaryPipeline {
        SummaryPipeline::new(
            self.media.clone(),
            self.transcriber.clone(),
            self.summarizer.clone(),
        )
    }
}

/// Names of the files currently in `dir`.
pub fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
