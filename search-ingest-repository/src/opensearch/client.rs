//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchEngineClient`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    http::request::JsonBody,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{
        IndicesCreateParts, IndicesDeleteAliasParts, IndicesDeleteParts, IndicesGetAliasParts,
        IndicesPutMappingParts,
    },
    BulkParts, IndexParts, OpenSearch,
};
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, instrument};

use crate::config::OpenSearchConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchEngineClient;
use crate::types::{AliasAction, BulkSummary};
use search_ingest_shared::Document;

/// Maximum number of item errors kept in a bulk summary.
const MAX_REPORTED_BULK_ERRORS: usize = 10;

/// OpenSearch client implementation.
///
/// # Example
///
/// ```ignore
/// let config = OpenSearchConfig::from_uri("http://localhost:9200")?;
/// let client = OpenSearchClient::new(&config)?;
///
/// client.create_index("location_1", &["location_wip".to_string()]).await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client from the given configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError)` - If transport setup fails
    pub fn new(config: &OpenSearchConfig) -> Result<Self, SearchError> {
        let conn_pool = SingleNodeConnectionPool::new(config.url.clone());
        let mut builder = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(config.request_timeout);

        if let Some((username, password)) = &config.credentials {
            builder = builder.auth(Credentials::Basic(username.clone(), password.clone()));
        }

        let transport = builder
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        info!(
            url = %config.url,
            authenticated = config.credentials.is_some(),
            "Created OpenSearch client"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }

    /// Turn a non-success response into an error.
    ///
    /// 404 maps to `SearchError::NotFound`; every other failure status is
    /// wrapped with `on_error`.
    async fn check(
        response: Response,
        on_error: fn(String) -> SearchError,
    ) -> Result<Response, SearchError> {
        let status = response.status_code();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 404 {
            return Err(SearchError::not_found(body));
        }

        error!(status = %status, body = %body, "Search engine request failed");
        Err(on_error(format!("status {}: {}", status, body)))
    }

    /// Build the newline-delimited bulk body for `documents`.
    fn bulk_body(documents: &[Document]) -> Vec<JsonBody<Value>> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for document in documents {
            let action = match document.id() {
                Some(id) => json!({"index": {"_id": id}}),
                None => json!({"index": {}}),
            };
            body.push(action.into());
            body.push(document.source().clone().into());
        }
        body
    }

    /// Summarise a bulk response body.
    fn parse_bulk_response(total: usize, body: &Value) -> BulkSummary {
        if !body.get("errors").and_then(Value::as_bool).unwrap_or(false) {
            return BulkSummary::all_succeeded(total);
        }

        let item_errors: Vec<&Value> = body
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("index").and_then(|i| i.get("error")))
                    .collect()
            })
            .unwrap_or_default();

        let failed = item_errors.len();
        let errors = item_errors
            .into_iter()
            .take(MAX_REPORTED_BULK_ERRORS)
            .map(|e| {
                e.get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string())
            })
            .collect();

        BulkSummary {
            total,
            succeeded: total.saturating_sub(failed),
            failed,
            errors,
        }
    }

    /// Index names from a `GET _alias/{name}` response body.
    fn parse_alias_response(body: &Value) -> Vec<String> {
        let mut indices: Vec<String> = body
            .as_object()
            .map(|indices| indices.keys().cloned().collect())
            .unwrap_or_default();
        indices.sort();
        indices
    }
}

#[async_trait]
impl SearchEngineClient for OpenSearchClient {
    #[instrument(skip(self))]
    async fn create_index(&self, index: &str, aliases: &[String]) -> Result<(), SearchError> {
        let aliases: Map<String, Value> = aliases
            .iter()
            .map(|alias| (alias.clone(), json!({})))
            .collect();

        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(json!({ "aliases": aliases }))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        Self::check(response, SearchError::IndexCreationError).await?;
        debug!(index = %index, "Index created");
        Ok(())
    }

    async fn get_alias(&self, alias: &str) -> Result<Vec<String>, SearchError> {
        let response = self
            .client
            .indices()
            .get_alias(IndicesGetAliasParts::Name(&[alias]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let response = Self::check(response, SearchError::AliasError).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        Ok(Self::parse_alias_response(&body))
    }

    #[instrument(skip(self, actions), fields(action_count = actions.len()))]
    async fn update_aliases(&self, actions: &[AliasAction]) -> Result<(), SearchError> {
        let actions: Vec<Value> = actions.iter().map(AliasAction::to_json).collect();

        let response = self
            .client
            .indices()
            .update_aliases()
            .body(json!({ "actions": actions }))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        Self::check(response, SearchError::AliasError).await?;
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        Self::check(response, SearchError::DeleteError).await?;
        debug!(index = %index, "Index deleted");
        Ok(())
    }

    async fn delete_alias(&self, alias: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .delete_alias(IndicesDeleteAliasParts::IndexName(&["*"], &[alias]))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        Self::check(response, SearchError::DeleteError).await?;
        debug!(alias = %alias, "Alias deleted");
        Ok(())
    }

    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .put_mapping(IndicesPutMappingParts::Index(&[index]))
            .body(mapping.clone())
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        Self::check(response, SearchError::MappingError).await?;
        Ok(())
    }

    async fn index_document(&self, index: &str, document: &Document) -> Result<(), SearchError> {
        let parts = match document.id() {
            Some(id) => IndexParts::IndexId(index, id),
            None => IndexParts::Index(index),
        };

        let response = self
            .client
            .index(parts)
            .body(document.source().clone())
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        Self::check(response, SearchError::IndexError).await?;
        Ok(())
    }

    async fn bulk_index(
        &self,
        index: &str,
        documents: &[Document],
    ) -> Result<BulkSummary, SearchError> {
        if documents.is_empty() {
            return Ok(BulkSummary::default());
        }

        let response = self
            .client
            .bulk(BulkParts::Index(index))
            .body(Self::bulk_body(documents))
            .send()
            .await
            .map_err(|e| SearchError::connection(e.to_string()))?;

        let response = Self::check(response, SearchError::BulkIndexError).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::parse(e.to_string()))?;

        Ok(Self::parse_bulk_response(documents.len(), &body))
    }
}
