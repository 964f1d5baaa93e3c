//! Linked Events importer.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::{endpoint_base, id_string};
use crate::errors::PipelineError;
use crate::importer::{ImportSummary, Importer, ImporterContext};
use crate::transport::{Paginator, Transport};
use search_ingest_repository::{IndexGroup, IndexLifecycleManager};
use search_ingest_shared::{Document, LanguageString, LinkedData};

const LINKED_EVENTS_SERVICE: &str = "linkedevents";
const ORIGIN: &str = "event";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeMeta {
    id: String,
    created_at: Option<String>,
    updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
struct Event {
    meta: NodeMeta,
    name: Option<LanguageString>,
    description: Option<LanguageString>,
}

#[derive(Debug, Serialize)]
struct EventRoot {
    event: Event,
    links: Vec<LinkedData>,
}

/// Streams the Linked Events listing page by page, publishing each event.
pub struct EventImporter {
    transport: Transport,
    url: String,
    group: IndexGroup,
}

impl EventImporter {
    pub fn new(context: &ImporterContext) -> Self {
        Self {
            transport: context.transport.clone(),
            url: context.sources.event.clone(),
            group: IndexGroup::new("event"),
        }
    }

    /// Canonical URL of a single event: the listing URL without its query,
    /// followed by the id.
    fn origin_url(&self, id: &str) -> String {
        format!("{}{}/", endpoint_base(&self.url), id)
    }

    fn build_document(&self, entry: &Value) -> Result<Option<Document>, PipelineError> {
        let Some(id) = id_string(entry.get("id")) else {
            warn!("Skipping event without id");
            return Ok(None);
        };

        let mut raw = entry.clone();
        if let Value::Object(fields) = &mut raw {
            fields.insert("id".to_string(), Value::String(id.clone()));
            fields.insert("origin".to_string(), Value::String(ORIGIN.to_string()));
        }

        let root = EventRoot {
            event: Event {
                meta: NodeMeta {
                    id: id.clone(),
                    created_at: text(entry.get("created_time")),
                    updated_at: text(entry.get("last_modified_time")),
                },
                name: LanguageString::from_record(entry, "name"),
                description: LanguageString::from_record(entry, "description"),
            },
            links: vec![LinkedData::new(LINKED_EVENTS_SERVICE, self.origin_url(&id), raw)],
        };

        Ok(Some(Document::identified(id, &root)?))
    }
}

fn text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

#[async_trait]
impl Importer for EventImporter {
    fn name(&self) -> &'static str {
        "event"
    }

    fn index_groups(&self) -> Vec<IndexGroup> {
        vec![self.group.clone()]
    }

    #[instrument(skip_all, fields(group = %self.group))]
    async fn run(
        &mut self,
        publisher: &IndexLifecycleManager,
    ) -> Result<ImportSummary, PipelineError> {
        let mut summary = ImportSummary::default();
        let mut pages = Paginator::new(&self.transport, self.url.clone());

        while let Some(page) = pages.next_page().await? {
            let entries = page
                .get("data")
                .and_then(Value::as_array)
                .ok_or_else(|| PipelineError::parse("Event page without a data list"))?;
            summary.received += entries.len();
            debug!(page = pages.pages(), count = entries.len(), "Received event page");

            for entry in entries {
                if let Some(document) = self.build_document(entry)? {
                    publisher.publish(&self.group, &document).await?;
                    summary.documents += 1;
                }
            }
        }

        info!(received = summary.received, pages = pages.pages(), "Received events");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::ImportRunner;
    use crate::sources::SourceUrls;
    use crate::testing::ScriptedClient;
    use search_ingest_repository::InMemorySearchEngine;
    use serde_json::json;
    use std::sync::Arc;

    const FIRST: &str = "https://events.test/v1/event/?start=today";
    const SECOND: &str = "https://events.test/v1/event/?start=today&page=2";

    fn client() -> Arc<ScriptedClient> {
        Arc::new(
            ScriptedClient::new()
                .route(
                    SECOND,
                    json!({
                        "meta": {"next": null},
                        "data": [{"id": "helsinki:2", "name": {"fi": "Konsertti"}}]
                    }),
                )
                .route(
                    FIRST,
                    json!({
                        "meta": {"next": SECOND},
                        "data": [{
                            "id": 1,
                            "name": {"fi": "Näyttely", "en": "Exhibition"},
                            "description": {"fi": "Kuvaus"},
                            "created_time": "2021-08-01T10:00:00Z",
                            "last_modified_time": "2021-08-02T10:00:00Z"
                        }]
                    }),
                ),
        )
    }

    fn importer(client: Arc<ScriptedClient>) -> EventImporter {
        let sources = SourceUrls::default().with_event_url(FIRST);
        EventImporter::new(&ImporterContext::new(Transport::new(client), sources))
    }

    #[tokio::test]
    async fn test_pages_are_followed_and_each_event_published() {
        let engine = Arc::new(InMemorySearchEngine::new());
        let runner = ImportRunner::new(Arc::new(IndexLifecycleManager::new(engine.clone())));
        let client = client();
        let mut importer = importer(client.clone());

        let summary = runner.base_run(&mut importer).await.unwrap();

        assert_eq!(summary, ImportSummary { received: 2, documents: 2 });
        assert_eq!(client.requests(), vec![FIRST.to_string(), SECOND.to_string()]);

        let documents = engine.documents("event");
        assert_eq!(documents.len(), 2);
        let first = &documents[0];
        assert_eq!(first["event"]["meta"]["id"], "1");
        assert_eq!(first["event"]["meta"]["createdAt"], "2021-08-01T10:00:00Z");
        assert_eq!(first["event"]["name"]["en"], "Exhibition");
        assert_eq!(first["links"][0]["service"], "linkedevents");
        assert_eq!(first["links"][0]["origin_url"], "https://events.test/v1/event/1/");
        assert_eq!(first["links"][0]["raw_data"]["id"], "1");
        assert_eq!(first["links"][0]["raw_data"]["origin"], "event");
        assert_eq!(documents[1]["event"]["description"], Value::Null);
    }

    #[tokio::test]
    async fn test_rerun_publishes_identical_documents() {
        let engine = Arc::new(InMemorySearchEngine::new());
        let runner = ImportRunner::new(Arc::new(IndexLifecycleManager::new(engine.clone())));

        runner.base_run(&mut importer(client())).await.unwrap();
        let before = engine.documents("event");
        runner.base_run(&mut importer(client())).await.unwrap();

        assert_eq!(engine.documents("event"), before);
        assert_eq!(engine.index_names(), vec!["event_2".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_page_aborts_without_publishing() {
        let engine = Arc::new(InMemorySearchEngine::new());
        let runner = ImportRunner::new(Arc::new(IndexLifecycleManager::new(engine.clone())));
        let client = Arc::new(ScriptedClient::new().route(
            FIRST,
            json!({"meta": {"next": "https://events.test/v1/event/?page=2"}, "data": [{"id": 1}]}),
        ));

        let err = runner.base_run(&mut importer(client)).await.unwrap_err();

        assert!(matches!(err, PipelineError::TransportError(_)));
        assert_eq!(engine.resolve_alias("event_wip"), vec!["event_1".to_string()]);
        assert_eq!(engine.resolve_alias("event"), vec!["event_1".to_string()]);
    }
}
