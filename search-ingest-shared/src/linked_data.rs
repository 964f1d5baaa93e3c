//! Provenance records attached to indexed documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The raw upstream payload a document was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedData {
    /// Name of the upstream service, e.g. `tpr` or `hauki`.
    pub service: String,
    /// URL the payload was fetched from.
    pub origin_url: String,
    pub raw_data: Value,
}

impl LinkedData {
    pub fn new(service: impl Into<String>, origin_url: impl Into<String>, raw_data: Value) -> Self {
        Self {
            service: service.into(),
            origin_url: origin_url.into(),
            raw_data,
        }
    }
}
