pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod server;
pub mod summarize;
pub mod temp;
pub mod transcribe;

pub use config::Config;
pub use error::{Result, VidsumError};
pub use pipeline::{PipelineResult, PipelineStage, SummaryPipeline};
pub use server::{router, AppState};
