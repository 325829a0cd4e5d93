use crate::error::{Result, VidsumError};
use crate::transcribe::{PollConfig, TranscriptStatus, Transcriber};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs::File;
use tracing::{debug, info, warn};

/// AssemblyAI API base URL.
const ASSEMBLYAI_BASE_URL: &str = "https://api.assemblyai.com";

/// AssemblyAI speech-to-text client.
///
/// A transcription is three steps: upload the audio, submit a transcript job
/// that references the uploaded asset, then poll the job until it settles.
pub struct AssemblyAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    poll: PollConfig,
}

impl AssemblyAiClient {
    /// Create a new AssemblyAI client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: ASSEMBLYAI_BASE_URL.to_string(),
            poll: PollConfig::default(),
        }
    }

    /// Point the client at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the status polling policy.
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Stream a local file to the upload endpoint and return its asset URL.
    pub async fn upload(&self, path: &Path) -> Result<String> {
        let file = File::open(path).await?;

        // No content length is set, so the body goes out chunked.
        let response = self
            .client
            .post(format!("{}/v2/upload", self.base_url))
            .header("authorization", &self.api_key)
            .header("content-type", "application/octet-stream")
            .body(reqwest::Body::from(file))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("AssemblyAI upload response ({}): {}", status, truncate(&body));

        if !status.is_success() {
            return Err(VidsumError::Upload(format!("HTTP {status}: {body}")));
        }

        let parsed: UploadResponse = serde_json::from_str(&body)
            .map_err(|e| VidsumError::Upload(format!("unexpected response: {e}")))?;

        parsed
            .upload_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| VidsumError::Upload("response has no upload_url".to_string()))
    }

    /// Create a transcript job for an uploaded asset and return the job id.
    pub async fn submit(&self, audio_url: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/v2/transcript", self.base_url))
            .header("authorization", &self.api_key)
            .json(&SubmitRequest { audio_url })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(VidsumError::Api(format!(
                "AssemblyAI transcript request failed ({status}): {body}"
            )));
        }

        let parsed: SubmitResponse = serde_json::from_str(&body)?;
        parsed.id.ok_or_else(|| {
            VidsumError::Api("AssemblyAI transcript response has no id".to_string())
        })
    }

    /// Fetch the current state of a transcript job.
    pub async fn fetch_status(&self, id: &str) -> Result<TranscriptResponse> {
        let response = self
            .client
            .get(format!("{}/v2/transcript/{}", self.base_url, id))
            .header("authorization", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(VidsumError::Api(format!(
                "AssemblyAI status request failed ({status}): {body}"
            )));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Poll a job until it reaches a terminal status.
    ///
    /// One status request is issued per interval, starting one interval after
    /// the call. Polling stops at the first terminal status.
    pub async fn wait_for_completion(&self, id: &str) -> Result<String> {
        match self.poll.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.poll_until_terminal(id))
                .await
                .map_err(|_| {
                    VidsumError::TranscriptionTimeout(format!(
                        "job {id} still pending after {:.0}s",
                        timeout.as_secs_f64()
                    ))
                })?,
            None => self.poll_until_terminal(id).await,
        }
    }

    async fn poll_until_terminal(&self, id: &str) -> Result<String> {
        let mut attempts: u32 = 0;

        loop {
            if let Some(max) = self.poll.max_attempts {
                if attempts >= max {
                    return Err(VidsumError::TranscriptionTimeout(format!(
                        "job {id} still pending after {attempts} status checks"
                    )));
                }
            }

            tokio::time::sleep(self.poll.interval).await;
            attempts += 1;

            let transcript = self.fetch_status(id).await?;
            debug!(
                "Transcript {} status after {} checks: {:?}",
                id, attempts, transcript.status
            );

            match transcript.status {
                TranscriptStatus::Completed => {
                    return Ok(transcript.text.unwrap_or_default());
                }
                TranscriptStatus::Failed | TranscriptStatus::Error => {
                    let reason = transcript
                        .error
                        .unwrap_or_else(|| "remote job failed".to_string());
                    warn!("Transcript {} failed: {}", id, reason);
                    return Err(VidsumError::TranscriptionFailed(reason));
                }
                _ => {}
            }
        }
    }
}

#[async_trait]
impl Transcriber for AssemblyAiClient {
    async fn transcribe(&self, audio: &Path) -> Result<String> {
        let upload_url = self.upload(audio).await?;
        debug!("Uploaded {} to {}", audio.display(), upload_url);

        let id = self.submit(&upload_url).await?;
        info!("Submitted transcript job {}", id);

        let text = self.wait_for_completion(&id).await?;
        info!("Transcript {} completed ({} chars)", id, text.len());
        Ok(text)
    }

    fn name(&self) -> &'static str {
        "AssemblyAI"
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(500) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

// Request/Response types

#[derive(Deserialize)]
struct UploadResponse {
    upload_url: Option<String>,
}

#[derive(Serialize)]
struct SubmitRequest<'a> {
    audio_url: &'a str,
}

#[derive(Deserialize)]
struct SubmitResponse {
    id: Option<String>,
}

/// Transcript job as reported by the status endpoint.
#[derive(Debug, Deserialize)]
pub struct TranscriptResponse {
    pub status: TranscriptStatus,
    pub text: Option<String>,
    pub error: Option<String>,
}
