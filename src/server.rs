use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{Result, VidsumError};
use crate::media::FfmpegMedia;
use crate::pipeline::SummaryPipeline;
use crate::summarize::GeminiSummarizer;
use crate::temp::TempFile;
use crate::transcribe::AssemblyAiClient;

/// Multipart field carrying the video.
pub const UPLOAD_FIELD: &str = "videoFile";

/// Shared request state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: SummaryPipeline,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(pipeline: SummaryPipeline, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            pipeline,
            upload_dir: upload_dir.into(),
        }
    }

    /// Build the production clients from a validated configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let assemblyai_key = config.assemblyai_api_key.clone().unwrap_or_default();
        let gemini_key = config.gemini_api_key.clone().unwrap_or_default();

        let transcriber = AssemblyAiClient::new(assemblyai_key).with_poll(config.poll_config());
        let summarizer = GeminiSummarizer::new(gemini_key).with_model(config.gemini_model.clone());
        let pipeline = SummaryPipeline::new(
            Arc::new(FfmpegMedia),
            Arc::new(transcriber),
            Arc::new(summarizer),
        );

        Ok(Self::new(pipeline, config.upload_dir.clone()))
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

impl IntoResponse for VidsumError {
    fn into_response(self) -> Response {
        let status = match &self {
            VidsumError::MissingFile | VidsumError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// Routes: `POST /upload`, everything else served from `public_dir`.
pub fn router(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        .route("/upload", post(upload_handler))
        .fallback_service(ServeDir::new(public_dir))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tracing::instrument(skip_all)]
pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Option<Multipart>,
) -> Response {
    match summarize_upload(&state, multipart).await {
        Ok(summary) => Json(SummaryResponse { summary }).into_response(),
        Err(e) => {
            error!("Error: {}", e);
            e.into_response()
        }
    }
}

async fn summarize_upload(state: &AppState, multipart: Option<Multipart>) -> Result<String> {
    let multipart = multipart.ok_or(VidsumError::MissingFile)?;
    let upload = save_upload(multipart, &state.upload_dir)
        .await?
        .ok_or(VidsumError::MissingFile)?;

    let result = state.pipeline.run(upload).await?;
    info!(
        "Summarized {:.1}s of media into {} sentences",
        result.duration_secs, result.sentences
    );
    Ok(result.summary)
}

/// Stream the `videoFile` field to the upload directory.
///
/// Other fields are skipped. Returns `None` when no file field is present
/// or the file field has an empty filename.
pub async fn save_upload(mut multipart: Multipart, dir: &Path) -> Result<Option<TempFile>> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| VidsumError::InvalidRequest(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        // Browsers send `filename=""` for an empty file input.
        let Some(original_name) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            continue;
        };

        let (mut file, upload) = create_upload_file(dir, &original_name).await?;
        debug!("Receiving {} into {}", original_name, upload.path().display());

        let mut bytes: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| VidsumError::InvalidRequest(e.to_string()))?
        {
            bytes += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        info!("Stored upload {} ({} bytes)", upload.path().display(), bytes);
        return Ok(Some(upload));
    }

    Ok(None)
}

async fn create_upload_file(
    dir: &Path,
    original_name: &str,
) -> Result<(tokio::fs::File, TempFile)> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let ext = upload_extension(original_name);

    let mut attempt = 0u32;
    loop {
        let name = if attempt == 0 {
            format!("{UPLOAD_FIELD}-{millis}{ext}")
        } else {
            format!("{UPLOAD_FIELD}-{millis}-{attempt}{ext}")
        };
        let path = dir.join(name);

        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => return Ok((file, TempFile::new(path))),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

/// `.ext` of the client's filename, or empty when absent or unsafe.
pub(crate) fn upload_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{e}"))
        .unwrap_or_default()
}

/// Serve `app` until Ctrl+C.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
