//! Document batching for bulk writes.

use tracing::{debug, instrument};

use search_ingest_repository::{IndexGroup, IndexLifecycleManager, SearchError};
use search_ingest_shared::Document;

/// Default number of documents per bulk request.
pub const BATCH_SIZE: usize = 100;

/// Accumulates documents for one group and writes them with `publish_bulk`.
///
/// The buffer flushes by itself when it reaches capacity. Callers must
/// flush once more at the end of the run; flushing an empty buffer is a
/// no-op.
pub struct BatchBuffer {
    group: IndexGroup,
    capacity: usize,
    pending: Vec<Document>,
    flushed: usize,
}

impl BatchBuffer {
    pub fn new(group: IndexGroup, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            group,
            capacity,
            pending: Vec::with_capacity(capacity),
            flushed: 0,
        }
    }

    /// Add a document, flushing when the buffer becomes full.
    pub async fn push(
        &mut self,
        publisher: &IndexLifecycleManager,
        document: Document,
    ) -> Result<(), SearchError> {
        self.pending.push(document);
        if self.pending.len() >= self.capacity {
            self.flush(publisher).await?;
        }
        Ok(())
    }

    /// Write all pending documents in one bulk request.
    #[instrument(skip(self, publisher), fields(group = %self.group, count = self.pending.len()))]
    pub async fn flush(&mut self, publisher: &IndexLifecycleManager) -> Result<(), SearchError> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let documents: Vec<Document> = self.pending.drain(..).collect();
        publisher.publish_bulk(&self.group, &documents).await?;
        self.flushed += documents.len();

        debug!(flushed = self.flushed, "Flushed documents");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Documents written so far.
    pub fn flushed(&self) -> usize {
        self.flushed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_ingest_repository::InMemorySearchEngine;
    use serde_json::json;
    use std::sync::Arc;

    async fn setup() -> (Arc<InMemorySearchEngine>, IndexLifecycleManager, IndexGroup) {
        let engine = Arc::new(InMemorySearchEngine::new());
        let manager = IndexLifecycleManager::new(engine.clone());
        let group = IndexGroup::new("location");
        manager.initialize(&group).await.unwrap();
        (engine, manager, group)
    }

    #[tokio::test]
    async fn test_flushes_when_full() {
        let (engine, manager, group) = setup().await;
        let mut buffer = BatchBuffer::new(group, 2);

        for i in 0..5 {
            buffer.push(&manager, Document::new(json!({"n": i}))).await.unwrap();
        }

        assert_eq!(buffer.flushed(), 4);
        assert_eq!(buffer.len(), 1);
        assert_eq!(engine.documents("location_wip").len(), 4);

        buffer.flush(&manager).await.unwrap();
        assert!(buffer.is_empty());
        assert_eq!(engine.documents("location_wip").len(), 5);
    }

    #[tokio::test]
    async fn test_flush_of_empty_buffer_is_noop() {
        let (engine, manager, group) = setup().await;
        let mut buffer = BatchBuffer::new(group.clone(), 3);

        buffer.flush(&manager).await.unwrap();

        assert_eq!(buffer.flushed(), 0);
        assert!(engine.documents("location_wip").is_empty());
        assert_eq!(manager.stats(&group).published, 0);
    }
}
