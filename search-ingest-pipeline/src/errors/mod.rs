//! Error types for the search ingest pipeline.

use search_ingest_repository::SearchError;
use thiserror::Error;

use crate::transport::TransportError;

/// Errors that abort an importer run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A source could not be fetched after retries.
    #[error("Transport error: {0}")]
    TransportError(#[from] TransportError),

    /// A lifecycle or write operation failed.
    #[error("Search error: {0}")]
    SearchError(#[from] SearchError),

    /// A document could not be serialized.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Source data did not have the expected shape.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// No importer is registered under the given name.
    #[error("Unknown importer: {0}")]
    UnknownImporter(String),

    /// The importer declares no index groups.
    #[error("Importer {0} is missing index groups")]
    NoIndexGroups(String),
}

impl PipelineError {
    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
