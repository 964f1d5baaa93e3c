//! Sequential dispatch of importer runs.

use std::time::Instant;

use chrono::Local;
use tracing::{error, info};

use crate::config::Dependencies;
use crate::IndexingError;
use search_ingest_pipeline::ImporterKind;

/// Run the importers one after another, stopping at the first failure.
pub async fn run_importers(
    dependencies: &Dependencies,
    kinds: &[ImporterKind],
) -> Result<(), IndexingError> {
    for kind in kinds {
        let mut importer = kind.build(&dependencies.context);
        let started_at = Local::now();
        let started = Instant::now();
        info!(importer = %kind, started_at = %started_at.to_rfc3339(), "Importer started");

        let result = dependencies.runner.base_run(importer.as_mut()).await;

        let ended_at = Local::now();
        let duration_secs = started.elapsed().as_secs_f64();
        match result {
            Ok(summary) => info!(
                importer = %kind,
                ended_at = %ended_at.to_rfc3339(),
                duration_secs = duration_secs,
                received = summary.received,
                documents = summary.documents,
                "Importer finished"
            ),
            Err(e) => {
                error!(
                    importer = %kind,
                    ended_at = %ended_at.to_rfc3339(),
                    duration_secs = duration_secs,
                    error = %e,
                    "Importer failed"
                );
                return Err(e.into());
            }
        }
    }
    Ok(())
}
