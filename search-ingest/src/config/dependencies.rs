//! Dependency initialization and wiring for the search ingest command.

use std::sync::Arc;

use tracing::info;

use crate::config::Settings;
use crate::IndexingError;
use search_ingest_pipeline::{
    ImportRunner, ImporterContext, JsonClient, ReqwestJsonClient, SourceUrls, Transport,
};
use search_ingest_repository::{IndexLifecycleManager, OpenSearchClient, SearchEngineClient};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// Runs importers between initialize and finish.
    pub runner: ImportRunner,
    /// Shared importer dependencies.
    pub context: ImporterContext,
}

impl Dependencies {
    /// Connect to OpenSearch and the source APIs.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If a client cannot be created
    pub fn new(settings: &Settings) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %settings.opensearch.url,
            authenticated = settings.opensearch.credentials.is_some(),
            event_url = %settings.sources.event,
            hauki_base_url = %settings.sources.hauki_base,
            "Initializing dependencies"
        );

        let search_client = OpenSearchClient::new(&settings.opensearch).map_err(|e| {
            IndexingError::config(format!("Failed to create OpenSearch client: {}", e))
        })?;
        let json_client = ReqwestJsonClient::new()
            .map_err(|e| IndexingError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_clients(
            Arc::new(search_client),
            Arc::new(json_client),
            settings.sources.clone(),
        ))
    }

    /// Wire dependencies around already constructed clients.
    pub fn with_clients(
        search_client: Arc<dyn SearchEngineClient>,
        json_client: Arc<dyn JsonClient>,
        sources: SourceUrls,
    ) -> Self {
        let lifecycle = Arc::new(IndexLifecycleManager::new(search_client));
        Self {
            runner: ImportRunner::new(lifecycle),
            context: ImporterContext::new(Transport::new(json_client), sources),
        }
    }
}
