//! In-memory search engine.
//!
//! Models just enough of the engine's index and alias behaviour for the
//! lifecycle manager and the importers to run without a cluster: aliases
//! resolve to indices, writes through an alias need exactly one target, alias
//! updates are applied all-or-nothing, and writes, deletes and alias updates
//! can be made to fail.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::types::{AliasAction, BulkSummary};
use search_ingest_shared::Document;

#[derive(Debug, Default, Clone)]
struct MemoryIndex {
    aliases: BTreeSet<String>,
    documents: Vec<(Option<String>, Value)>,
    mappings: Vec<Value>,
}

impl MemoryIndex {
    fn write(&mut self, document: &Document) {
        let (id, source) = document.clone().into_parts();
        if let Some(id) = &id {
            if let Some(slot) = self
                .documents
                .iter_mut()
                .find(|(existing, _)| existing.as_ref() == Some(id))
            {
                slot.1 = source;
                return;
            }
        }
        self.documents.push((id, source));
    }
}

#[derive(Debug, Default)]
struct EngineState {
    indices: BTreeMap<String, MemoryIndex>,
    fail_writes: bool,
    delete_failure: Option<SearchError>,
    alias_update_failure: Option<SearchError>,
    alias_updates: Vec<Vec<AliasAction>>,
}

impl EngineState {
    fn indices_for_alias(&self, alias: &str) -> Vec<String> {
        self.indices
            .iter()
            .filter(|(_, index)| index.aliases.contains(alias))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Resolve a write target: an index name, or an alias with exactly one index.
    fn write_target(&mut self, name: &str) -> Result<&mut MemoryIndex, SearchError> {
        let target = if self.indices.contains_key(name) {
            name.to_string()
        } else {
            let mut indices = self.indices_for_alias(name);
            match indices.len() {
                0 => return Err(SearchError::not_found(format!("no such index [{}]", name))),
                1 => indices.remove(0),
                _ => {
                    return Err(SearchError::index(format!(
                        "alias [{}] has more than one index and no write index",
                        name
                    )))
                }
            }
        };

        self.indices
            .get_mut(&target)
            .ok_or_else(|| SearchError::not_found(format!("no such index [{}]", target)))
    }
}

/// A search engine kept in process memory.
#[derive(Debug, Default)]
pub struct InMemorySearchEngine {
    state: Mutex<EngineState>,
}

impl InMemorySearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        // A poisoned lock only means a test thread panicked mid-update.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make document writes fail with a connection error.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Make index and alias deletes fail with `error`, or succeed again with `None`.
    pub fn set_delete_failure(&self, error: Option<SearchError>) {
        self.state().delete_failure = error;
    }

    /// Make alias update requests fail with `error`, or succeed again with `None`.
    pub fn set_alias_update_failure(&self, error: Option<SearchError>) {
        self.state().alias_update_failure = error;
    }

    /// Names of all physical indices, sorted.
    pub fn index_names(&self) -> Vec<String> {
        self.state().indices.keys().cloned().collect()
    }

    /// Indices the alias points at, sorted.
    pub fn resolve_alias(&self, alias: &str) -> Vec<String> {
        self.state().indices_for_alias(alias)
    }

    /// Aliases of an index, sorted.
    pub fn aliases_of(&self, index: &str) -> Vec<String> {
        self.state()
            .indices
            .get(index)
            .map(|i| i.aliases.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Documents readable through an index or alias name, in write order.
    pub fn documents(&self, name: &str) -> Vec<Value> {
        let state = self.state();
        let names = if state.indices.contains_key(name) {
            vec![name.to_string()]
        } else {
            state.indices_for_alias(name)
        };

        names
            .iter()
            .filter_map(|n| state.indices.get(n))
            .flat_map(|index| index.documents.iter().map(|(_, source)| source.clone()))
            .collect()
    }

    /// Mappings applied to a physical index, in order.
    pub fn mappings(&self, index: &str) -> Vec<Value> {
        self.state()
            .indices
            .get(index)
            .map(|i| i.mappings.clone())
            .unwrap_or_default()
    }

    /// Every alias update request received, one entry per request.
    pub fn alias_updates(&self) -> Vec<Vec<AliasAction>> {
        self.state().alias_updates.clone()
    }
}

#[async_trait]
impl SearchEngineClient for InMemorySearchEngine {
    async fn create_index(&self, index: &str, aliases: &[String]) -> Result<(), SearchError> {
        let mut state = self.state();
        if state.indices.contains_key(index) {
            return Err(SearchError::index_creation(format!(
                "resource_already_exists_exception: index [{}] already exists",
                index
            )));
        }
        if let Some(alias) = aliases.iter().find(|a| state.indices.contains_key(a.as_str())) {
            return Err(SearchError::index_creation(format!(
                "invalid_alias_name_exception: an index exists with the same name \
                 as the alias [{}]",
                alias
            )));
        }

        state.indices.insert(
            index.to_string(),
            MemoryIndex {
                aliases: aliases.iter().cloned().collect(),
                ..MemoryIndex::default()
            },
        );
        Ok(())
    }

    async fn get_alias(&self, alias: &str) -> Result<Vec<String>, SearchError> {
        let indices = self.state().indices_for_alias(alias);
        if indices.is_empty() {
            return Err(SearchError::not_found(format!("alias [{}] missing", alias)));
        }
        Ok(indices)
    }

    async fn update_aliases(&self, actions: &[AliasAction]) -> Result<(), SearchError> {
        let mut state = self.state();
        if let Some(error) = state.alias_update_failure.clone() {
            return Err(error);
        }

        // Validate everything before touching any alias.
        let mut next = state.indices.clone();
        for action in actions {
            match action {
                AliasAction::Add { index, alias } => {
                    let target = next.get_mut(index).ok_or_else(|| {
                        SearchError::not_found(format!("no such index [{}]", index))
                    })?;
                    target.aliases.insert(alias.clone());
                }
                AliasAction::Remove { index, alias } => {
                    let target = next.get_mut(index).ok_or_else(|| {
                        SearchError::not_found(format!("no such index [{}]", index))
                    })?;
                    if !target.aliases.remove(alias) {
                        return Err(SearchError::not_found(format!(
                            "aliases [{}] missing on index [{}]",
                            alias, index
                        )));
                    }
                }
            }
        }

        state.indices = next;
        state.alias_updates.push(actions.to_vec());
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), SearchError> {
        let mut state = self.state();
        if let Some(error) = state.delete_failure.clone() {
            return Err(error);
        }
        match state.indices.remove(index) {
            Some(_) => Ok(()),
            None => Err(SearchError::not_found(format!("index_not_found_exception [{}]", index))),
        }
    }

    async fn delete_alias(&self, alias: &str) -> Result<(), SearchError> {
        let mut state = self.state();
        if let Some(error) = state.delete_failure.clone() {
            return Err(error);
        }
        let mut removed = false;
        for index in state.indices.values_mut() {
            removed |= index.aliases.remove(alias);
        }

        if removed {
            Ok(())
        } else {
            Err(SearchError::not_found(format!("aliases [{}] missing", alias)))
        }
    }

    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), SearchError> {
        let mut state = self.state();
        let target = state.write_target(index)?;
        target.mappings.push(mapping.clone());
        Ok(())
    }

    async fn index_document(&self, index: &str, document: &Document) -> Result<(), SearchError> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(SearchError::connection("connection refused"));
        }
        state.write_target(index)?.write(document);
        Ok(())
    }

    async fn bulk_index(
        &self,
        index: &str,
        documents: &[Document],
    ) -> Result<BulkSummary, SearchError> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(SearchError::connection("connection refused"));
        }

        let target = state.write_target(index)?;
        for document in documents {
            target.write(document);
        }
        Ok(BulkSummary::all_succeeded(documents.len()))
    }
}
