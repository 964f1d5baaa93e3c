//! HTTP transport for source APIs.
//!
//! Every source request is a plain `GET url -> JSON`. [`JsonClient`] performs
//! a single attempt; [`Transport`] wraps it in the [`RetryPolicy`] and the
//! default timeout. The client is injected so importers can be tested without
//! network access.

mod client;
mod pagination;
mod retry;

pub use client::{JsonClient, ReqwestJsonClient};
pub use pagination::{fetch_all_results, next_page_url, Paginator};
pub use retry::RetryPolicy;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

/// Default timeout for a single request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Timeout for endpoints returning very large bodies.
pub const HEAVY_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors of a single source request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// No response: connection failure or timeout.
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// Non-2xx response.
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// Response body was not valid JSON.
    #[error("Invalid JSON from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// Whether another attempt could succeed.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::InvalidUrl(_))
    }
}

/// Source API access with retries.
#[derive(Clone)]
pub struct Transport {
    client: Arc<dyn JsonClient>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl Transport {
    /// Create a transport with the default retry policy and timeout.
    pub fn new(client: Arc<dyn JsonClient>) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// GET `url` with the default timeout.
    pub async fn request_json(&self, url: &str) -> Result<Value, TransportError> {
        self.request_json_with_timeout(url, self.timeout).await
    }

    /// GET `url`, retrying failed attempts per the retry policy.
    ///
    /// The error of the last attempt is returned once retries are exhausted.
    pub async fn request_json_with_timeout(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        debug!(url = %url, "Requesting URL");

        let result = self
            .retry
            .run_if(|| self.client.get_json(url, timeout), TransportError::is_transient)
            .await;
        if let Err(e) = &result {
            error!(url = %url, error = %e, "Error while requesting");
        }
        result
    }
}
