//! Scripted source client for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::transport::{JsonClient, TransportError};

enum Route {
    Fixed(Value),
    Sequence(VecDeque<Result<Value, TransportError>>),
}

/// [`JsonClient`] answering from canned responses.
///
/// A request is served by the route with the longest URL prefix matching it.
/// Unmatched requests fail with a 404 status.
#[derive(Default)]
pub struct ScriptedClient {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<(String, Duration)>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `prefix` with `body`.
    pub fn route(self, prefix: &str, body: Value) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(prefix.to_string(), Route::Fixed(body));
        self
    }

    /// Answer `prefix` with `responses` in order.
    pub fn sequence(self, prefix: &str, responses: Vec<Result<Value, TransportError>>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(prefix.to_string(), Route::Sequence(responses.into()));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    pub fn requests_matching(&self, prefix: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|url| url.starts_with(prefix))
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn timeouts(&self) -> Vec<Duration> {
        self.requests.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

#[async_trait]
impl JsonClient for ScriptedClient {
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<Value, TransportError> {
        self.requests.lock().unwrap().push((url.to_string(), timeout));

        let mut routes = self.routes.lock().unwrap();
        let key = routes
            .keys()
            .filter(|prefix| url.starts_with(prefix.as_str()))
            .max_by_key(|prefix| prefix.len())
            .cloned();
        let not_found = TransportError::Status {
            url: url.to_string(),
            status: 404,
        };

        let route = match key {
            Some(k) => routes.get_mut(&k),
            None => None,
        };
        match route {
            Some(Route::Fixed(body)) => Ok(body.clone()),
            Some(Route::Sequence(queue)) => queue.pop_front().unwrap_or(Err(not_found)),
            None => Err(not_found),
        }
    }
}
