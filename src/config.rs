use crate::error::{Result, VidsumError};
use crate::transcribe::PollConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3001;

/// Default Gemini model used for summaries.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Default interval between transcript status checks (seconds).
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub assemblyai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub public_dir: PathBuf,
    pub poll_interval_secs: u64,
    pub poll_max_attempts: Option<u32>,
    pub poll_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            assemblyai_api_key: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from("uploads"),
            public_dir: PathBuf::from("public"),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            poll_max_attempts: None,
            poll_timeout_secs: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = toml::from_str::<Config>(&contents).map_err(|e| {
                    VidsumError::Config(format!("{}: {e}", config_path.display()))
                })?;
            }
        }

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Override fields from environment-style lookups.
    ///
    /// Unparsable numeric values are ignored and the previous value kept.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ASSEMBLYAI_API_KEY") {
            self.assemblyai_api_key = Some(key);
        }
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.gemini_api_key = Some(key);
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.gemini_model = model;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        if let Some(dir) = lookup("VIDSUM_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("VIDSUM_PUBLIC_DIR") {
            self.public_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup("VIDSUM_POLL_INTERVAL_SECS").and_then(|s| s.parse().ok()) {
            self.poll_interval_secs = secs;
        }
        if let Some(n) = lookup("VIDSUM_POLL_MAX_ATTEMPTS").and_then(|s| s.parse().ok()) {
            self.poll_max_attempts = Some(n);
        }
        if let Some(secs) = lookup("VIDSUM_POLL_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.poll_timeout_secs = Some(secs);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.assemblyai_api_key.as_deref().unwrap_or("").is_empty() {
            return Err(VidsumError::Config(
                "ASSEMBLYAI_API_KEY not set. Get one at https://www.assemblyai.com/dashboard"
                    .to_string(),
            ));
        }

        if self.gemini_api_key.as_deref().unwrap_or("").is_empty() {
            return Err(VidsumError::Config(
                "GEMINI_API_KEY not set. Get one at https://aistudio.google.com/apikey"
                    .to_string(),
            ));
        }

        if self.poll_interval_secs == 0 {
            return Err(VidsumError::Config(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Polling policy for transcript status checks.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.poll_max_attempts,
            timeout: self.poll_timeout_secs.map(Duration::from_secs),
        }
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vidsum").join("config.toml"))
    }
}
