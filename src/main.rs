use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vidsum::config::Config;
use vidsum::media::{check_ffmpeg, check_ffprobe};
use vidsum::server::{self, AppState};

#[derive(Parser)]
#[command(name = "vidsum")]
#[command(version, about = "Summarize uploaded videos using AI")]
#[command(
    long_about = "HTTP service that transcribes uploaded videos with AssemblyAI and summarizes the transcript with Google Gemini."
)]
struct Cli {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for request-scoped upload files
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Directory of static assets served at /
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "info,vidsum=debug,tower_http=debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Variables already set in the environment take precedence over `.env`.
    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring .env: {}", e),
    }

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(dir) = cli.upload_dir {
        config.upload_dir = dir;
    }
    if let Some(dir) = cli.public_dir {
        config.public_dir = dir;
    }
    config
        .validate()
        .context("Configuration validation failed")?;

    if let Err(e) = check_ffmpeg().await {
        warn!("{}", e);
    }
    if let Err(e) = check_ffprobe().await {
        warn!("{}", e);
    }

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.upload_dir.display()))?;

    let state = AppState::from_config(&config).context("Failed to build clients")?;
    let app = server::router(state, &config.public_dir);

    info!("Uploads:  {}", config.upload_dir.display());
    info!("Static:   {}", config.public_dir.display());
    info!("Model:    {}", config.gemini_model);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server is running on port {}", config.port);

    server::serve(listener, app).await?;
    Ok(())
}
