//! Search engine client trait definition.
//!
//! This module defines the index, alias and document operations the ingest
//! system needs from a search engine, allowing for different backend
//! implementations (OpenSearch, in-memory, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use crate::types::{AliasAction, BulkSummary};
use search_ingest_shared::Document;

/// Abstract interface for search engine operations.
///
/// `index` arguments of the document operations may name either a physical
/// index or an alias resolving to exactly one index.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// Missing indices and aliases are reported as `SearchError::NotFound`, and a
/// request that got no response at all as `SearchError::ConnectionError`.
/// Callers decide which of these they tolerate.
#[async_trait]
pub trait SearchEngineClient: Send + Sync {
    /// Create an index bound to the given aliases.
    ///
    /// # Arguments
    ///
    /// * `index` - Name of the physical index
    /// * `aliases` - Aliases pointing at the new index
    async fn create_index(&self, index: &str, aliases: &[String]) -> Result<(), SearchError>;

    /// Resolve an alias to the indices it points at.
    ///
    /// # Returns
    ///
    /// * `Ok(indices)` - Names of the indices, sorted
    /// * `Err(SearchError::NotFound)` - If the alias does not exist
    async fn get_alias(&self, alias: &str) -> Result<Vec<String>, SearchError>;

    /// Apply alias actions atomically in a single request.
    async fn update_aliases(&self, actions: &[AliasAction]) -> Result<(), SearchError>;

    /// Delete a physical index.
    ///
    /// # Returns
    ///
    /// * `Err(SearchError::NotFound)` - If the index does not exist
    async fn delete_index(&self, index: &str) -> Result<(), SearchError>;

    /// Remove an alias from every index it points at.
    ///
    /// # Returns
    ///
    /// * `Err(SearchError::NotFound)` - If the alias does not exist
    async fn delete_alias(&self, alias: &str) -> Result<(), SearchError>;

    /// Add field mappings to an index.
    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), SearchError>;

    /// Index a single document.
    ///
    /// A document with an explicit id replaces any document with the same id.
    async fn index_document(&self, index: &str, document: &Document) -> Result<(), SearchError>;

    /// Index multiple documents in a single bulk request.
    ///
    /// # Returns
    ///
    /// * `Ok(BulkSummary)` - Per-item outcome; rejected items do not fail the call
    /// * `Err(SearchError)` - If the request as a whole failed
    async fn bulk_index(
        &self,
        index: &str,
        documents: &[Document],
    ) -> Result<BulkSummary, SearchError>;
}
