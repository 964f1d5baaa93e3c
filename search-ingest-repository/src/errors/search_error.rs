//! Search error types.
//!
//! This module defines the error types that can occur during search engine
//! operations.

use thiserror::Error;

/// Errors that can occur during search engine operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// No response could be obtained from the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The index or alias does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Failed to create an index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to read or update aliases.
    #[error("Alias error: {0}")]
    AliasError(String),

    /// Failed to delete an index or alias.
    #[error("Delete error: {0}")]
    DeleteError(String),

    /// Failed to apply a mapping.
    #[error("Mapping error: {0}")]
    MappingError(String),

    /// Failed to index a single document.
    #[error("Index error: {0}")]
    IndexError(String),

    /// Bulk indexing request failed as a whole.
    #[error("Bulk index error: {0}")]
    BulkIndexError(String),

    /// Failed to parse a response from the search engine.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The staging alias of a group does not resolve to any index.
    #[error("Staging alias {0} does not point to any index")]
    StagingAliasMissing(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create an alias error.
    pub fn alias(msg: impl Into<String>) -> Self {
        Self::AliasError(msg.into())
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        Self::IndexError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Whether the error means the index or alias is missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the error happened at the connection level.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(SearchError::not_found("location_2").is_not_found());
        assert!(!SearchError::not_found("location_2").is_connection());
        assert!(SearchError::connection("refused").is_connection());
        assert!(!SearchError::alias("bad").is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = SearchError::StagingAliasMissing("location_wip".to_string());
        assert_eq!(
            err.to_string(),
            "Staging alias location_wip does not point to any index"
        );
    }
}
