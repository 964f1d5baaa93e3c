//! Following next-page pointers of paginated sources.
//!
//! Sources expose the next page either as a top-level `next` (service map)
//! or as `meta.next` (linked events). Iteration stops when the pointer is
//! null or missing.

use std::time::Duration;

use serde_json::Value;

use super::{Transport, TransportError, DEFAULT_TIMEOUT};

/// Next-page URL of a response body, if any.
pub fn next_page_url(body: &Value) -> Option<String> {
    body.get("next")
        .and_then(Value::as_str)
        .or_else(|| body.get("meta").and_then(|m| m.get("next")).and_then(Value::as_str))
        .filter(|next| !next.is_empty())
        .map(str::to_string)
}

/// Page-by-page iteration over a paginated source.
pub struct Paginator<'a> {
    transport: &'a Transport,
    next: Option<String>,
    timeout: Duration,
    pages: usize,
}

impl<'a> Paginator<'a> {
    pub fn new(transport: &'a Transport, start_url: impl Into<String>) -> Self {
        Self {
            transport,
            next: Some(start_url.into()),
            timeout: DEFAULT_TIMEOUT,
            pages: 0,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch the next page, or `None` once the source is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Value>, TransportError> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };

        let body = self.transport.request_json_with_timeout(&url, self.timeout).await?;
        self.next = next_page_url(&body);
        self.pages += 1;
        Ok(Some(body))
    }

    /// Pages fetched so far.
    pub fn pages(&self) -> usize {
        self.pages
    }
}

/// Collect the `results_key` arrays of every page into one list.
pub async fn fetch_all_results(
    transport: &Transport,
    start_url: &str,
    results_key: &str,
) -> Result<Vec<Value>, TransportError> {
    let mut paginator = Paginator::new(transport, start_url);
    let mut results = Vec::new();

    while let Some(page) = paginator.next_page().await? {
        if let Some(items) = page.get(results_key).and_then(Value::as_array) {
            results.extend(items.iter().cloned());
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClient;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_next_page_url_variants() {
        assert_eq!(
            next_page_url(&json!({"next": "https://a.test/?page=2"})),
            Some("https://a.test/?page=2".to_string())
        );
        assert_eq!(
            next_page_url(&json!({"meta": {"next": "https://b.test/?page=3"}})),
            Some("https://b.test/?page=3".to_string())
        );
        assert_eq!(next_page_url(&json!({"next": null})), None);
        assert_eq!(next_page_url(&json!({"meta": {"next": null}})), None);
        assert_eq!(next_page_url(&json!({"data": []})), None);
    }

    #[tokio::test]
    async fn test_fetch_all_results_follows_next() {
        let client = Arc::new(
            ScriptedClient::new()
                .route(
                    "https://a.test/units/?page=2",
                    json!({"next": null, "results": [{"id": 3}]}),
                )
                .route(
                    "https://a.test/units/",
                    json!({
                        "next": "https://a.test/units/?page=2",
                        "results": [{"id": 1}, {"id": 2}]
                    }),
                ),
        );
        let transport = Transport::new(client.clone());

        let results = fetch_all_results(&transport, "https://a.test/units/", "results")
            .await
            .unwrap();

        assert_eq!(results, vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);
        assert_eq!(client.request_count(), 2);
    }

    #[tokio::test]
    async fn test_paginator_counts_pages() {
        let client = Arc::new(ScriptedClient::new().route(
            "https://e.test/event/",
            json!({"meta": {"next": null}, "data": []}),
        ));
        let transport = Transport::new(client);
        let mut paginator = Paginator::new(&transport, "https://e.test/event/");

        assert!(paginator.next_page().await.unwrap().is_some());
        assert!(paginator.next_page().await.unwrap().is_none());
        assert_eq!(paginator.pages(), 1);
    }
}
