//! Single-attempt JSON clients.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::TransportError;

/// A single `GET url -> JSON` attempt.
#[async_trait]
pub trait JsonClient: Send + Sync {
    /// Fetch `url` and decode the body as JSON.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL to fetch
    /// * `timeout` - Limit for the whole request
    ///
    /// # Returns
    ///
    /// * `Ok(Value)` - The decoded body of a 2xx response
    /// * `Err(TransportError)` - No response, non-2xx status or invalid JSON
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<Value, TransportError>;
}

/// [`JsonClient`] backed by a shared `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestJsonClient {
    client: reqwest::Client,
}

impl ReqwestJsonClient {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("search-ingest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Request {
                url: String::new(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonClient for ReqwestJsonClient {
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<Value, TransportError> {
        let parsed = url::Url::parse(url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", url, e)))?;

        let response = self
            .client
            .get(parsed)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| TransportError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
