//! Service ontology importers.
//!
//! The ontology consists of flat keywords ("ontology words") and a tree of
//! service categories. Both lists are small and fetched whole.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::id_string;
use crate::errors::PipelineError;
use crate::importer::{ImportSummary, Importer, ImporterContext};
use crate::sources::SourceUrls;
use crate::transport::Transport;
use search_ingest_repository::{IndexGroup, IndexLifecycleManager};
use search_ingest_shared::{Document, LanguageString};

/// In-memory lookup over ontology words and tree nodes.
#[derive(Debug, Default)]
pub struct Ontology {
    words: Vec<Value>,
    tree: Vec<Value>,
    words_by_id: HashMap<String, usize>,
    tree_by_id: HashMap<String, usize>,
}

impl Ontology {
    pub fn new(words: Vec<Value>, tree: Vec<Value>) -> Self {
        let index = |items: &[Value]| {
            items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| id_string(item.get("id")).map(|id| (id, i)))
                .collect::<HashMap<_, _>>()
        };
        Self {
            words_by_id: index(&words),
            tree_by_id: index(&tree),
            words,
            tree,
        }
    }

    /// Fetch both the words and the tree.
    pub async fn fetch(transport: &Transport, sources: &SourceUrls) -> Result<Self, PipelineError> {
        let tree = fetch_list(transport, &sources.ontology_tree).await?;
        let words = fetch_list(transport, &sources.ontology_words).await?;
        Ok(Self::new(words, tree))
    }

    pub fn tree(&self) -> &[Value] {
        &self.tree
    }

    pub fn word(&self, id: &str) -> Option<&Value> {
        self.words_by_id.get(id).map(|&i| &self.words[i])
    }

    pub fn tree_node(&self, id: &str) -> Option<&Value> {
        self.tree_by_id.get(id).map(|&i| &self.tree[i])
    }

    /// Ids of the node's ancestors, nearest first.
    ///
    /// The walk stops at a root, at an unknown parent, or at a cycle.
    pub fn ancestor_ids(&self, id: &str) -> Vec<Value> {
        let mut ancestors = Vec::new();
        let mut seen = HashSet::from([id.to_string()]);
        let mut current = self.tree_node(id);

        while let Some(node) = current {
            let Some(parent_id) = id_string(node.get("parent_id")) else {
                break;
            };
            if !seen.insert(parent_id.clone()) {
                warn!(node_id = %id, parent_id = %parent_id, "Cycle in ontology tree");
                break;
            }
            current = self.tree_node(&parent_id);
            if let Some(parent) = current {
                ancestors.push(parent.get("id").cloned().unwrap_or(Value::Null));
            }
        }

        ancestors
    }
}

pub(crate) async fn fetch_list(
    transport: &Transport,
    url: &str,
) -> Result<Vec<Value>, PipelineError> {
    match transport.request_json(url).await? {
        Value::Array(items) => Ok(items),
        other => Err(PipelineError::parse(format!(
            "Expected a list from {}, got {}",
            url,
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Serialize)]
struct OntologyWordObject {
    name: Option<LanguageString>,
}

/// Indexes ontology words by id.
pub struct OntologyWordImporter {
    transport: Transport,
    url: String,
    group: IndexGroup,
}

impl OntologyWordImporter {
    pub fn new(context: &ImporterContext) -> Self {
        Self {
            transport: context.transport.clone(),
            url: context.sources.ontology_words.clone(),
            group: IndexGroup::new("ontology_word"),
        }
    }
}

#[async_trait]
impl Importer for OntologyWordImporter {
    fn name(&self) -> &'static str {
        "ontology_word"
    }

    fn index_groups(&self) -> Vec<IndexGroup> {
        vec![self.group.clone()]
    }

    #[instrument(skip_all, fields(group = %self.group))]
    async fn run(
        &mut self,
        publisher: &IndexLifecycleManager,
    ) -> Result<ImportSummary, PipelineError> {
        let words = fetch_list(&self.transport, &self.url).await?;
        let mut summary = ImportSummary {
            received: words.len(),
            documents: 0,
        };

        for word in &words {
            let Some(id) = id_string(word.get("id")) else {
                warn!("Skipping ontology word without id");
                continue;
            };
            let object = OntologyWordObject {
                name: LanguageString::from_record(word, "ontologyword"),
            };
            publisher
                .publish(&self.group, &Document::identified(id, &object)?)
                .await?;
            summary.documents += 1;
        }

        info!(received = summary.received, "Imported ontology words");
        Ok(summary)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OntologyTreeObject {
    name: Option<LanguageString>,
    ancestor_ids: Vec<Value>,
    child_ids: Value,
    ontology_word_reference: Option<Value>,
}

/// Indexes ontology tree nodes by id, with their ancestors.
pub struct OntologyTreeImporter {
    transport: Transport,
    sources: SourceUrls,
    group: IndexGroup,
}

impl OntologyTreeImporter {
    pub fn new(context: &ImporterContext) -> Self {
        Self {
            transport: context.transport.clone(),
            sources: context.sources.clone(),
            group: IndexGroup::new("ontology_tree"),
        }
    }
}

#[async_trait]
impl Importer for OntologyTreeImporter {
    fn name(&self) -> &'static str {
        "ontology_tree"
    }

    fn index_groups(&self) -> Vec<IndexGroup> {
        vec![self.group.clone()]
    }

    #[instrument(skip_all, fields(group = %self.group))]
    async fn run(
        &mut self,
        publisher: &IndexLifecycleManager,
    ) -> Result<ImportSummary, PipelineError> {
        let tree = fetch_list(&self.transport, &self.sources.ontology_tree).await?;
        let ontology = Ontology::new(Vec::new(), tree);
        let mut summary = ImportSummary {
            received: ontology.tree().len(),
            documents: 0,
        };

        for node in ontology.tree() {
            let Some(id) = id_string(node.get("id")) else {
                warn!("Skipping ontology tree node without id");
                continue;
            };
            let object = OntologyTreeObject {
                name: LanguageString::from_record(node, "name"),
                ancestor_ids: ontology.ancestor_ids(&id),
                child_ids: node.get("child_ids").cloned().unwrap_or(Value::Array(Vec::new())),
                ontology_word_reference: node
                    .get("ontologyword_reference")
                    .filter(|v| !v.is_null())
                    .cloned(),
            };
            publisher
                .publish(&self.group, &Document::identified(id, &object)?)
                .await?;
            summary.documents += 1;
        }

        info!(received = summary.received, "Imported ontology tree");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::ImportRunner;
    use crate::testing::ScriptedClient;
    use search_ingest_repository::InMemorySearchEngine;
    use serde_json::json;
    use std::sync::Arc;

    fn tree() -> Value {
        json!([
            {"id": 1, "name_fi": "Liikunta", "name_en": "Sports", "child_ids": [2]},
            {
                "id": 2,
                "parent_id": 1,
                "name_fi": "Uinti",
                "child_ids": [3],
                "ontologyword_reference": "33"
            },
            {"id": 3, "parent_id": 2, "name_fi": "Maauimalat", "child_ids": []}
        ])
    }

    fn words() -> Value {
        json!([
            {
                "id": 33,
                "ontologyword_fi": "uimahalli",
                "ontologyword_sv": "simhall",
                "ontologyword_en": "swimming hall"
            },
            {"id": 34, "ontologyword_fi": "kirjasto"}
        ])
    }

    fn context(client: Arc<ScriptedClient>) -> ImporterContext {
        ImporterContext::new(Transport::new(client), SourceUrls::default())
    }

    fn client() -> Arc<ScriptedClient> {
        Arc::new(
            ScriptedClient::new()
                .route(crate::sources::ONTOLOGY_TREE_URL, tree())
                .route(crate::sources::ONTOLOGY_WORD_URL, words()),
        )
    }

    #[test]
    fn test_ancestor_ids_nearest_first() {
        let tree = tree().as_array().cloned().unwrap();
        let ontology = Ontology::new(Vec::new(), tree);

        assert_eq!(ontology.ancestor_ids("3"), vec![json!(2), json!(1)]);
        assert_eq!(ontology.ancestor_ids("1"), Vec::<Value>::new());
        assert_eq!(ontology.ancestor_ids("404"), Vec::<Value>::new());
    }

    #[test]
    fn test_ancestor_walk_stops_at_cycle() {
        let ontology = Ontology::new(
            Vec::new(),
            vec![json!({"id": 1, "parent_id": 2}), json!({"id": 2, "parent_id": 1})],
        );

        assert_eq!(ontology.ancestor_ids("1"), vec![json!(2)]);
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_list() {
        let client = Arc::new(
            ScriptedClient::new()
                .route(crate::sources::ONTOLOGY_TREE_URL, json!({"detail": "maintenance"}))
                .route(crate::sources::ONTOLOGY_WORD_URL, words()),
        );
        let transport = Transport::new(client);

        let err = Ontology::fetch(&transport, &SourceUrls::default()).await.unwrap_err();
        assert!(matches!(err, PipelineError::ParseError(_)));
    }

    #[tokio::test]
    async fn test_word_importer_publishes_names() {
        let engine = Arc::new(InMemorySearchEngine::new());
        let runner = ImportRunner::new(Arc::new(IndexLifecycleManager::new(engine.clone())));
        let mut importer = OntologyWordImporter::new(&context(client()));

        let summary = runner.base_run(&mut importer).await.unwrap();

        assert_eq!(summary.documents, 2);
        let documents = engine.documents("ontology_word");
        assert_eq!(
            documents[0]["name"],
            json!({"fi": "uimahalli", "sv": "simhall", "en": "swimming hall"})
        );
        assert_eq!(documents[1]["name"], json!({"fi": "kirjasto", "sv": null, "en": null}));
    }

    #[tokio::test]
    async fn test_tree_importer_links_ancestors_and_children() {
        let engine = Arc::new(InMemorySearchEngine::new());
        let runner = ImportRunner::new(Arc::new(IndexLifecycleManager::new(engine.clone())));
        let client = client();
        let mut importer = OntologyTreeImporter::new(&context(client.clone()));

        runner.base_run(&mut importer).await.unwrap();

        let documents = engine.documents("ontology_tree");
        assert_eq!(documents.len(), 3);
        assert_eq!(documents[2]["ancestorIds"], json!([2, 1]));
        assert_eq!(documents[1]["childIds"], json!([3]));
        assert_eq!(documents[1]["ontologyWordReference"], "33");
        assert_eq!(documents[0]["ontologyWordReference"], Value::Null);
        assert!(client.requests_matching(crate::sources::ONTOLOGY_WORD_URL).is_empty());
    }
}
