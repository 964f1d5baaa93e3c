//! Index lifecycle manager implementation.
//!
//! This module provides the component importers use to write documents.
//! It owns generation creation, deletion and aliasing; nothing else in the
//! system mutates these aliases.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::lifecycle::IndexGroup;
use crate::types::AliasAction;
use search_ingest_shared::Document;

/// Per-group write counters for the current run.
///
/// Failed writes do not abort an import, so a finished generation can be
/// missing documents. `dropped` makes that visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishStats {
    /// Documents accepted by the search engine.
    pub published: u64,
    /// Documents lost to write failures.
    pub dropped: u64,
}

/// Maintains the two generations and the published/staging aliases of each
/// index group.
///
/// A single manager is not safe to run concurrently for the same group: a
/// second `initialize` deletes the first run's staging generation.
pub struct IndexLifecycleManager {
    client: Arc<dyn SearchEngineClient>,
    stats: Mutex<HashMap<String, PublishStats>>,
}

impl IndexLifecycleManager {
    pub fn new(client: Arc<dyn SearchEngineClient>) -> Self {
        Self {
            client,
            stats: Mutex::new(HashMap::new()),
        }
    }

    /// Prepare a fresh staging generation for `group`.
    ///
    /// Deletes every generation except the published one and any stale
    /// staging alias, then creates the free generation behind the staging
    /// alias. When nothing is published yet the published alias is bound to
    /// the new generation too, so a first import is readable while it runs.
    #[instrument(skip(self, group), fields(group = %group))]
    pub async fn initialize(&self, group: &IndexGroup) -> Result<(), SearchError> {
        let published = self.resolve_alias(group.published_alias()).await?;
        let staging = group.free_generation(published.as_deref());

        for generation in group.generations() {
            if published.as_deref() != Some(generation.as_str()) {
                self.delete_index_if_exists(&generation).await?;
            }
        }
        self.delete_alias_if_exists(&group.staging_alias()).await?;

        let mut aliases = vec![group.staging_alias()];
        if published.is_none() {
            aliases.push(group.published_alias().to_string());
        }

        debug!(index = %staging, aliases = ?aliases, "Creating staging generation");
        self.client.create_index(&staging, &aliases).await?;

        self.stats_map()
            .insert(group.base_name().to_string(), PublishStats::default());

        info!(
            staging = %staging,
            published = published.as_deref().unwrap_or("<none>"),
            "Index group initialized"
        );
        Ok(())
    }

    /// Apply a custom mapping to the staging generation.
    pub async fn apply_mapping(
        &self,
        group: &IndexGroup,
        mapping: &Value,
    ) -> Result<(), SearchError> {
        let target = group.staging_alias();
        debug!(index = %target, "Applying custom mapping");
        self.client.put_mapping(&target, mapping).await
    }

    /// Write one document into the staging generation.
    ///
    /// Connection failures are logged and counted as dropped; the run
    /// continues. Any other failure is returned.
    pub async fn publish(
        &self,
        group: &IndexGroup,
        document: &Document,
    ) -> Result<(), SearchError> {
        let target = group.staging_alias();
        match self.client.index_document(&target, document).await {
            Ok(()) => {
                self.record(group, 1, 0);
                Ok(())
            }
            Err(e) if e.is_connection() => {
                error!(
                    group = %group,
                    document_id = document.id().unwrap_or("<auto>"),
                    error = %e,
                    "Dropped document after connection failure"
                );
                self.record(group, 0, 1);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Write a batch of documents into the staging generation in one request.
    ///
    /// An empty batch is a no-op. A connection failure drops the whole batch;
    /// rejected items of an otherwise successful request are dropped one by
    /// one. Both are logged and counted, neither aborts the run.
    pub async fn publish_bulk(
        &self,
        group: &IndexGroup,
        documents: &[Document],
    ) -> Result<(), SearchError> {
        if documents.is_empty() {
            return Ok(());
        }

        let target = group.staging_alias();
        match self.client.bulk_index(&target, documents).await {
            Ok(summary) => {
                if summary.has_failures() {
                    error!(
                        group = %group,
                        failed = summary.failed,
                        total = summary.total,
                        errors = ?summary.errors,
                        "Bulk request rejected documents"
                    );
                }
                self.record(group, summary.succeeded as u64, summary.failed as u64);
                Ok(())
            }
            Err(e) if e.is_connection() => {
                error!(
                    group = %group,
                    count = documents.len(),
                    error = %e,
                    "Dropped batch after connection failure"
                );
                self.record(group, 0, documents.len() as u64);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Publish the staging generation.
    ///
    /// One atomic alias request binds the published alias to the staging
    /// generation and unbinds it from the previously published one, and
    /// removes the staging alias. The previously published generation is
    /// deleted afterwards.
    #[instrument(skip(self, group), fields(group = %group))]
    pub async fn finish(&self, group: &IndexGroup) -> Result<(), SearchError> {
        let staging_alias = group.staging_alias();
        let staging = self
            .resolve_alias(&staging_alias)
            .await?
            .ok_or_else(|| SearchError::StagingAliasMissing(staging_alias.clone()))?;
        let previous = self.resolve_alias(group.published_alias()).await?;

        let mut actions = vec![AliasAction::add(&staging, group.published_alias())];
        if let Some(previous) = previous.as_deref().filter(|p| *p != staging) {
            actions.push(AliasAction::remove(previous, group.published_alias()));
        }
        actions.push(AliasAction::remove(&staging, &staging_alias));

        self.client.update_aliases(&actions).await?;

        if let Some(previous) = previous.filter(|p| *p != staging) {
            self.delete_index_if_exists(&previous).await?;
        }

        let stats = self.stats(group);
        if stats.dropped > 0 {
            warn!(
                published = stats.published,
                dropped = stats.dropped,
                "Published generation is missing documents"
            );
        }
        info!(
            generation = %staging,
            published = stats.published,
            dropped = stats.dropped,
            "Index group published"
        );
        Ok(())
    }

    /// The generation readers currently see, if any.
    pub async fn published_generation(
        &self,
        group: &IndexGroup,
    ) -> Result<Option<String>, SearchError> {
        self.resolve_alias(group.published_alias()).await
    }

    /// The generation the running import writes to, if any.
    pub async fn staging_generation(
        &self,
        group: &IndexGroup,
    ) -> Result<Option<String>, SearchError> {
        self.resolve_alias(&group.staging_alias()).await
    }

    /// Write counters of `group` since its last `initialize`.
    pub fn stats(&self, group: &IndexGroup) -> PublishStats {
        self.stats_map()
            .get(group.base_name())
            .copied()
            .unwrap_or_default()
    }

    async fn resolve_alias(&self, alias: &str) -> Result<Option<String>, SearchError> {
        match self.client.get_alias(alias).await {
            Ok(indices) => Ok(indices.into_iter().next()),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn delete_index_if_exists(&self, index: &str) -> Result<(), SearchError> {
        debug!(index = %index, "Deleting index");
        match self.client.delete_index(index).await {
            Err(e) if e.is_not_found() => {
                debug!(index = %index, "Index does not exist");
                Ok(())
            }
            other => other,
        }
    }

    async fn delete_alias_if_exists(&self, alias: &str) -> Result<(), SearchError> {
        debug!(alias = %alias, "Deleting alias");
        match self.client.delete_alias(alias).await {
            Err(e) if e.is_not_found() => Ok(()),
            other => other,
        }
    }

    fn record(&self, group: &IndexGroup, published: u64, dropped: u64) {
        let mut stats = self.stats_map();
        let entry = stats.entry(group.base_name().to_string()).or_default();
        entry.published += published;
        entry.dropped += dropped;
    }

    fn stats_map(&self) -> MutexGuard<'_, HashMap<String, PublishStats>> {
        self.stats.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemorySearchEngine;
    use serde_json::json;

    fn setup() -> (Arc<InMemorySearchEngine>, IndexLifecycleManager) {
        let engine = Arc::new(InMemorySearchEngine::new());
        let manager = IndexLifecycleManager::new(engine.clone());
        (engine, manager)
    }

    #[tokio::test]
    async fn test_first_initialize_exposes_staging_generation() {
        let (engine, manager) = setup();
        let group = IndexGroup::new("location");

        manager.initialize(&group).await.unwrap();

        assert_eq!(engine.index_names(), vec!["location_1"]);
        assert_eq!(engine.resolve_alias("location"), vec!["location_1"]);
        assert_eq!(engine.resolve_alias("location_wip"), vec!["location_1"]);
    }

    #[tokio::test]
    async fn test_publish_writes_through_staging_alias() {
        let (engine, manager) = setup();
        let group = IndexGroup::new("ontology_word");
        manager.initialize(&group).await.unwrap();

        manager
            .publish(&group, &Document::with_id("1", json!({"name": "a"})))
            .await
            .unwrap();
        manager
            .publish_bulk(&group, &[Document::new(json!({"name": "b"}))])
            .await
            .unwrap();

        assert_eq!(engine.documents("ontology_word_1").len(), 2);
        assert_eq!(manager.stats(&group), PublishStats { published: 2, dropped: 0 });
    }

    #[tokio::test]
    async fn test_connection_failures_are_swallowed_and_counted() {
        let (engine, manager) = setup();
        let group = IndexGroup::new("event");
        manager.initialize(&group).await.unwrap();
        engine.set_fail_writes(true);

        manager
            .publish(&group, &Document::new(json!({})))
            .await
            .unwrap();
        manager
            .publish_bulk(&group, &[Document::new(json!({})), Document::new(json!({}))])
            .await
            .unwrap();

        assert_eq!(manager.stats(&group), PublishStats { published: 0, dropped: 3 });
    }

    #[tokio::test]
    async fn test_other_write_failures_propagate() {
        let (_engine, manager) = setup();
        let group = IndexGroup::new("event");

        let err = manager
            .publish(&group, &Document::new(json!({})))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_empty_bulk_is_noop() {
        let (_engine, manager) = setup();
        let group = IndexGroup::new("event");

        manager.publish_bulk(&group, &[]).await.unwrap();
        assert_eq!(manager.stats(&group), PublishStats::default());
    }

    #[tokio::test]
    async fn test_finish_swaps_in_one_request_and_deletes_previous() {
        let (engine, manager) = setup();
        let group = IndexGroup::new("location");

        manager.initialize(&group).await.unwrap();
        manager.finish(&group).await.unwrap();
        manager.initialize(&group).await.unwrap();
        manager.finish(&group).await.unwrap();

        assert_eq!(engine.index_names(), vec!["location_2"]);
        assert_eq!(engine.aliases_of("location_2"), vec!["location"]);

        let last = engine.alias_updates().pop().unwrap();
        assert_eq!(
            last,
            vec![
                AliasAction::add("location_2", "location"),
                AliasAction::remove("location_1", "location"),
                AliasAction::remove("location_2", "location_wip"),
            ]
        );
    }

    #[tokio::test]
    async fn test_finish_without_initialize_fails() {
        let (_engine, manager) = setup();
        let err = manager.finish(&IndexGroup::new("event")).await.unwrap_err();
        assert_eq!(err, SearchError::StagingAliasMissing("event_wip".to_string()));
    }

    #[tokio::test]
    async fn test_initialize_propagates_cleanup_failures() {
        let (engine, manager) = setup();
        let group = IndexGroup::new("location");
        manager.initialize(&group).await.unwrap();
        manager.finish(&group).await.unwrap();

        let blocked = SearchError::DeleteError("cluster_block_exception".to_string());
        engine.set_delete_failure(Some(blocked.clone()));
        let err = manager.initialize(&group).await.unwrap_err();

        assert_eq!(err, blocked);
        assert_eq!(engine.index_names(), vec!["location_1"]);
        assert!(engine.resolve_alias("location_wip").is_empty());
    }

    #[tokio::test]
    async fn test_initialize_swallows_missing_resources() {
        let (engine, manager) = setup();
        let group = IndexGroup::new("location");

        manager.initialize(&group).await.unwrap();
        // location_2 and location_wip do not exist on the second run either.
        manager.finish(&group).await.unwrap();
        manager.initialize(&group).await.unwrap();

        assert_eq!(engine.index_names(), vec!["location_1", "location_2"]);
    }

    #[tokio::test]
    async fn test_failed_swap_leaves_published_alias() {
        let (engine, manager) = setup();
        let group = IndexGroup::new("event");
        manager.initialize(&group).await.unwrap();
        manager.finish(&group).await.unwrap();
        manager.initialize(&group).await.unwrap();

        engine.set_alias_update_failure(Some(SearchError::alias("illegal_argument_exception")));
        let err = manager.finish(&group).await.unwrap_err();

        assert_eq!(err, SearchError::alias("illegal_argument_exception"));
        assert_eq!(engine.resolve_alias("event"), vec!["event_1"]);
        assert_eq!(engine.resolve_alias("event_wip"), vec!["event_2"]);
        assert_eq!(engine.index_names(), vec!["event_1", "event_2"]);
    }

    #[tokio::test]
    async fn test_apply_mapping_targets_staging_generation() {
        let (engine, manager) = setup();
        let group = IndexGroup::new("location");
        manager.initialize(&group).await.unwrap();

        let mapping = json!({"properties": {"location": {"type": "geo_point"}}});
        manager.apply_mapping(&group, &mapping).await.unwrap();

        assert_eq!(engine.mappings("location_1"), vec![mapping]);
    }
}
