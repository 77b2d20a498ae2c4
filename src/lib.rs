pub mod cli;
pub mod config;
pub mod pipeline;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::ConfigError;
use crate::pipeline::generation::GenerationError;
use crate::pipeline::storage::StorageError;

/// Failures that end a run. Everything else is absorbed inside the pipeline.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Install the global subscriber. `RUST_LOG` wins over the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
