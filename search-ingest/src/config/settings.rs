//! Settings read from the environment.

use std::env;
use std::time::Duration;

use search_ingest_pipeline::SourceUrls;
use search_ingest_repository::OpenSearchConfig;

use crate::IndexingError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub opensearch: OpenSearchConfig,
    pub sources: SourceUrls,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_URL` (or `ES_URI`): server URL, may embed credentials
    ///   (default: http://localhost:9200)
    /// - `OPENSEARCH_USERNAME` / `OPENSEARCH_PASSWORD`: basic auth, overriding
    ///   credentials in the URL
    /// - `OPENSEARCH_REQUEST_TIMEOUT_SECS`: request timeout (default: 60)
    /// - `EVENT_URL`: Linked Events listing URL
    /// - `HAUKI_BASE_URL`: Hauki API base URL
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let url = get("OPENSEARCH_URL")
            .or_else(|| get("ES_URI"))
            .unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());
        let mut opensearch = OpenSearchConfig::from_uri(&url)
            .map_err(|e| IndexingError::config(format!("Invalid OPENSEARCH_URL: {}", e)))?;

        if let Some(username) = get("OPENSEARCH_USERNAME") {
            let password = get("OPENSEARCH_PASSWORD").unwrap_or_default();
            opensearch = opensearch.with_credentials(username, password);
        }

        if let Some(timeout) = get("OPENSEARCH_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = timeout.parse().map_err(|_| {
                IndexingError::config(format!(
                    "OPENSEARCH_REQUEST_TIMEOUT_SECS must be a number of seconds, got {}",
                    timeout
                ))
            })?;
            opensearch = opensearch.with_request_timeout(Duration::from_secs(secs));
        }

        let mut sources = SourceUrls::default();
        if let Some(event_url) = get("EVENT_URL") {
            sources = sources.with_event_url(event_url);
        }
        if let Some(hauki_base_url) = get("HAUKI_BASE_URL") {
            sources = sources.with_hauki_base_url(hauki_base_url);
        }

        Ok(Self { opensearch, sources })
    }
}
