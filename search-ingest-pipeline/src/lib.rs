//! # Search Ingest Pipeline
//!
//! This crate provides the batch import pipeline that fetches records from
//! paginated REST sources and publishes them through the index lifecycle
//! manager.
//!
//! ## Architecture
//!
//! 1. **Transport**: single JSON GET with timeout and a fixed retry policy
//! 2. **Importer**: one full ingestion run per logical index group, wrapped
//!    by `ImportRunner::base_run` in initialize/finish
//! 3. **BatchBuffer**: accumulates documents and flushes them in bulk
//! 4. **Opening hours**: batched fetching and open-range computation

pub mod errors;
pub mod importer;
pub mod importers;
pub mod opening_hours;
pub mod sources;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use errors::PipelineError;
pub use importer::{
    BatchBuffer, ImportRunner, ImportSummary, Importer, ImporterContext, ImporterKind,
};
pub use sources::SourceUrls;
pub use transport::{JsonClient, ReqwestJsonClient, RetryPolicy, Transport, TransportError};
