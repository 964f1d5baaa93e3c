//! # Search Ingest
//!
//! Entry point library for the search ingest command: CLI arguments,
//! environment settings, dependency wiring and sequential dispatch of the
//! selected importers.

pub mod cli;
pub mod config;
pub mod logging;
pub mod runner;

pub use cli::Cli;
pub use config::{Dependencies, Settings};
pub use runner::run_importers;

use thiserror::Error;

/// Errors that can occur during start-up or an import.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An importer run failed.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] search_ingest_pipeline::PipelineError),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
