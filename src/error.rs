use thiserror::Error;

#[derive(Error, Debug)]
pub enum VidsumError {
    #[error("No file uploaded.")]
    MissingFile,

    #[error("Invalid upload request: {0}")]
    InvalidRequest(String),

    #[error("Failed to probe media: {0}")]
    Probe(String),

    #[error("Audio extraction failed: {0}")]
    Transcode(String),

    #[error("Failed to upload file to AssemblyAI: {0}")]
    Upload(String),

    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    #[error("Transcription did not complete: {0}")]
    TranscriptionTimeout(String),

    #[error("Gemini summarization failed: {0}")]
    Summarization(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VidsumError>;
