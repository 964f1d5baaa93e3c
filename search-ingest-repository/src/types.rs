//! Request and response types for search engine operations.

use serde_json::{json, Value};

/// One action of an atomic alias update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasAction {
    /// Point `alias` at `index`.
    Add { index: String, alias: String },
    /// Stop pointing `alias` at `index`.
    Remove { index: String, alias: String },
}

impl AliasAction {
    pub fn add(index: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Add {
            index: index.into(),
            alias: alias.into(),
        }
    }

    pub fn remove(index: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::Remove {
            index: index.into(),
            alias: alias.into(),
        }
    }

    /// The action in `_aliases` request body form.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Add { index, alias } => json!({"add": {"index": index, "alias": alias}}),
            Self::Remove { index, alias } => {
                json!({"remove": {"index": index, "alias": alias}})
            }
        }
    }
}

/// Outcome of a bulk indexing request.
///
/// A bulk request can succeed as a whole while individual items are rejected;
/// those are counted in `failed` with their reasons in `errors`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkSummary {
    /// Total number of documents in the request.
    pub total: usize,
    /// Number of documents written.
    pub succeeded: usize,
    /// Number of documents rejected.
    pub failed: usize,
    /// Reasons reported for rejected documents.
    pub errors: Vec<String>,
}

impl BulkSummary {
    /// Summary of a request in which every document was written.
    pub fn all_succeeded(total: usize) -> Self {
        Self {
            total,
            succeeded: total,
            failed: 0,
            errors: Vec::new(),
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_action_json() {
        assert_eq!(
            AliasAction::add("location_2", "location").to_json(),
            json!({"add": {"index": "location_2", "alias": "location"}})
        );
        assert_eq!(
            AliasAction::remove("location_2", "location_wip").to_json(),
            json!({"remove": {"index": "location_2", "alias": "location_wip"}})
        );
    }

    #[test]
    fn test_bulk_summary() {
        let summary = BulkSummary::all_succeeded(3);
        assert_eq!(summary.succeeded, 3);
        assert!(!summary.has_failures());
    }
}
