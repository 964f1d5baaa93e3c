//! The importer contract.
//!
//! An importer performs one full ingestion run for one or more index
//! groups. [`ImportRunner::base_run`] wraps the run: every group is
//! initialized first and finished only when the run succeeds, so a failed
//! run leaves the published generations untouched.

mod buffer;
mod registry;

pub use buffer::{BatchBuffer, BATCH_SIZE};
pub use registry::{ImporterContext, ImporterKind};

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{error, info, instrument};

use crate::errors::PipelineError;
use search_ingest_repository::{IndexGroup, IndexLifecycleManager};

/// Counts reported by a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Records read from the sources.
    pub received: usize,
    /// Documents handed to the lifecycle manager.
    pub documents: usize,
}

/// One data source import.
#[async_trait]
pub trait Importer: Send {
    /// Registry name of the importer.
    fn name(&self) -> &'static str;

    /// Index groups written by the importer. Must not be empty.
    fn index_groups(&self) -> Vec<IndexGroup>;

    /// Fetch the sources and publish documents into the staging generations.
    ///
    /// # Arguments
    ///
    /// * `publisher` - Lifecycle manager whose groups have been initialized
    ///
    /// # Returns
    ///
    /// * `Ok(ImportSummary)` - Counts of the run
    /// * `Err(PipelineError)` - The run failed and must not be finished
    async fn run(
        &mut self,
        publisher: &IndexLifecycleManager,
    ) -> Result<ImportSummary, PipelineError>;
}

/// Runs importers between `initialize` and `finish` of their groups.
pub struct ImportRunner {
    lifecycle: Arc<IndexLifecycleManager>,
}

impl ImportRunner {
    pub fn new(lifecycle: Arc<IndexLifecycleManager>) -> Self {
        Self { lifecycle }
    }

    pub fn lifecycle(&self) -> &IndexLifecycleManager {
        &self.lifecycle
    }

    /// Initialize every group, run the importer, then finish every group.
    ///
    /// When the run fails the groups are not finished: their staging
    /// generations stay unpublished and are cleaned up by the next run.
    #[instrument(skip_all, fields(importer = importer.name()))]
    pub async fn base_run(
        &self,
        importer: &mut dyn Importer,
    ) -> Result<ImportSummary, PipelineError> {
        let groups = importer.index_groups();
        if groups.is_empty() {
            return Err(PipelineError::NoIndexGroups(importer.name().to_string()));
        }

        for group in &groups {
            self.lifecycle.initialize(group).await?;
        }

        let started = Instant::now();
        let summary = match importer.run(&self.lifecycle).await {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "Import failed, staging generations left unpublished");
                return Err(e);
            }
        };

        for group in &groups {
            self.lifecycle.finish(group).await?;
        }

        info!(
            received = summary.received,
            documents = summary.documents,
            duration_ms = started.elapsed().as_millis() as u64,
            "Import finished"
        );
        Ok(summary)
    }
}
